//! Transactions and the balance ledger.

mod ledger;
mod model;
mod repository;
mod service;

pub use ledger::*;
pub use model::*;
pub use repository::*;
pub use service::*;

//! SQLite storage for transactions and the incremental balance ledger.

mod model;
mod repository;

pub use model::*;
pub use repository::*;

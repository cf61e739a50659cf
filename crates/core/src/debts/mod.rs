//! Debt ledgers: inter-box loans and third-party payables.

mod amortization;
mod model;
mod repository;
mod service;

pub use amortization::*;
pub use model::*;
pub use repository::*;
pub use service::*;

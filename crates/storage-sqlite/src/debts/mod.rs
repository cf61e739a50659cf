//! SQLite storage for both debt ledgers.

mod model;
mod repository;

pub use model::*;
pub use repository::*;

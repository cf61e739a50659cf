//! SQLite storage for the reference entities.

mod model;
mod repository;

pub use model::*;
pub use repository::*;

//! SQLite storage for cash boxes, including balance effect application.

mod model;
mod repository;

pub use model::*;
pub use repository::*;

//! SQLite storage for the sync queue and the local-replica maintenance hooks.

mod model;
mod replica;
mod repository;

pub use model::*;
pub use replica::*;
pub use repository::*;

#[cfg(test)]
mod tests;

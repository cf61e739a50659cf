//! Domain core for multi-company cash management: cash boxes, transactions,
//! debt ledgers and the offline-first sync engine.
//!
//! Storage backends and the remote transport live in sibling crates and plug
//! in through the repository and datastore traits defined here.

pub mod boxes;
pub mod debts;
pub mod entities;
pub mod errors;
pub mod sync;
pub mod transactions;

pub use errors::{Error, Result};

//! Offline-first synchronization: queue model, outbound projection, engine
//! and background worker.

mod engine;
mod model;
mod projection;
mod remote;
mod worker;

pub use engine::*;
pub use model::*;
pub use projection::*;
pub use remote::*;
pub use worker::*;

//! REST transport for the remote source of truth.
//!
//! Implements the core `RemoteDataStore` contract against a PostgREST-style
//! API and classifies provider responses into the closed error-kind enum the
//! sync engine branches on.

mod client;
mod error;

pub use client::{HttpConnectivityProbe, RestRemoteStore};
pub use error::{RemoteClientError, Result};

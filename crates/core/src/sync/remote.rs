//! Remote datastore contract consumed by the sync engine.
//!
//! The transport implementation lives in its own crate; the engine only ever
//! sees the structured error kind, never provider-specific text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::SyncTable;

/// Closed classification of remote failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteErrorKind {
    /// The record already exists remotely; treated as success by the engine.
    Duplicate,
    /// A referenced foreign id does not exist remotely.
    ForeignKeyViolation,
    /// Network, timeout or server-side failure worth retrying later.
    Transient,
    Unknown,
}

/// Error returned by every remote datastore operation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("remote {kind:?}: {message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// CRUD transport against the remote source of truth.
///
/// `insert`/`update`/`delete` push one projected row; `fetch_table` pulls a
/// whole table for the startup full replace. Implementations must carry a
/// bounded timeout and report expiry as [`RemoteErrorKind::Transient`].
#[async_trait]
pub trait RemoteDataStore: Send + Sync {
    async fn insert(
        &self,
        table: SyncTable,
        row: serde_json::Value,
    ) -> std::result::Result<(), RemoteError>;

    async fn update(
        &self,
        table: SyncTable,
        record_id: &str,
        row: serde_json::Value,
    ) -> std::result::Result<(), RemoteError>;

    async fn delete(
        &self,
        table: SyncTable,
        record_id: &str,
    ) -> std::result::Result<(), RemoteError>;

    async fn fetch_table(
        &self,
        table: SyncTable,
    ) -> std::result::Result<Vec<serde_json::Value>, RemoteError>;
}

/// Boolean "currently online" oracle.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_online(&self) -> bool;
}

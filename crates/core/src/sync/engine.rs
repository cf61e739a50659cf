//! Queue-draining sync engine.
//!
//! One pass walks the queue oldest-first, projects each payload onto the
//! remote schema and dispatches it. Remote failures never escape the pass:
//! they are classified, recorded on the entry and reported in the summary.
//! Only local-store failures propagate as errors.

use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::errors::Result;

use super::{
    null_out_relations, project_outbound, BootstrapReport, RemoteDataStore, RemoteError,
    RemoteErrorKind, SyncEntryError, SyncOperation, SyncQueueEntry, SyncQueueRepositoryTrait,
    SyncReplicaTrait, SyncSummary, SyncTable,
};

enum Resolution {
    Confirmed,
    MissingRelation(String),
    Deferred(String),
}

enum EntryOutcome {
    Confirmed,
    Deferred(String),
}

pub struct SyncEngine {
    queue: Arc<dyn SyncQueueRepositoryTrait>,
    replica: Arc<dyn SyncReplicaTrait>,
    remote: Arc<dyn RemoteDataStore>,
    // Process-wide pass lock: at most one drain runs at a time; concurrent
    // triggers wait here and then drain whatever is left.
    pass_lock: Mutex<()>,
}

impl SyncEngine {
    pub fn new(
        queue: Arc<dyn SyncQueueRepositoryTrait>,
        replica: Arc<dyn SyncReplicaTrait>,
        remote: Arc<dyn RemoteDataStore>,
    ) -> Self {
        Self {
            queue,
            replica,
            remote,
            pass_lock: Mutex::new(()),
        }
    }

    /// Queue depth, surfaced to the UI as the pending-sync counter.
    pub fn pending_count(&self) -> Result<i64> {
        self.queue.pending_count()
    }

    /// Drains the queue once, oldest-first.
    ///
    /// Each entry is confirmed (deleted, `sincronizado` flipped where the
    /// table carries it) or left queued with its failure recorded. A single
    /// failing entry never aborts the batch.
    pub async fn process_queue(&self) -> Result<SyncSummary> {
        let _guard = self.pass_lock.lock().await;

        let entries = self.queue.list_oldest_first()?;
        if entries.is_empty() {
            return Ok(SyncSummary::empty());
        }
        debug!("Sync pass starting with {} queued entries", entries.len());

        let mut synced_count = 0usize;
        let mut errors = Vec::new();
        for entry in entries {
            match self.process_entry(&entry).await? {
                EntryOutcome::Confirmed => synced_count += 1,
                EntryOutcome::Deferred(message) => {
                    warn!(
                        "Sync entry {} ({} {:?}) deferred: {}",
                        entry.id,
                        entry.table.table_name(),
                        entry.operation,
                        message
                    );
                    self.queue.record_failure(entry.id, message.clone()).await?;
                    errors.push(SyncEntryError {
                        entry_id: entry.id,
                        table: entry.table,
                        operation: entry.operation,
                        message,
                    });
                }
            }
        }

        let summary = SyncSummary {
            success: errors.is_empty(),
            synced_count,
            errors,
        };
        info!(
            "Sync pass finished: {} synced, {} deferred",
            summary.synced_count,
            summary.errors.len()
        );
        Ok(summary)
    }

    /// Pulls every table wholesale from the remote source of truth and
    /// replaces the local contents (full replace, not merge). Used once at
    /// startup to seed or refresh the local store.
    pub async fn refresh_from_remote(&self) -> Result<BootstrapReport> {
        let mut tables = Vec::with_capacity(SyncTable::ALL.len());
        let mut rows_total = 0usize;
        for table in SyncTable::ALL {
            let rows = self.remote.fetch_table(table).await?;
            rows_total += rows.len();
            debug!("Pulled {} rows for {}", rows.len(), table.table_name());
            tables.push((table, rows));
        }
        self.replica.replace_all(tables).await?;
        info!(
            "Local store refreshed from remote: {} tables, {} rows",
            SyncTable::ALL.len(),
            rows_total
        );
        Ok(BootstrapReport {
            tables: SyncTable::ALL.len(),
            rows: rows_total,
        })
    }

    async fn process_entry(&self, entry: &SyncQueueEntry) -> Result<EntryOutcome> {
        let payload: Value = match serde_json::from_str(&entry.payload) {
            Ok(value) => value,
            Err(err) => {
                return Ok(EntryOutcome::Deferred(format!(
                    "Payload decode failed: {err}"
                )))
            }
        };
        let projected = project_outbound(entry.table, &payload);

        let first = self.dispatch(entry, projected.clone()).await;
        match self.classify(entry, first) {
            Resolution::Confirmed => {
                self.complete(entry, &payload).await?;
                Ok(EntryOutcome::Confirmed)
            }
            Resolution::MissingRelation(message) => {
                // Single retry with the optional relation fields nulled out.
                let nulled = null_out_relations(entry.table, &projected);
                debug!(
                    "Sync entry {} retrying with relations nulled after: {}",
                    entry.id, message
                );
                let second = self.dispatch(entry, nulled).await;
                match self.classify(entry, second) {
                    Resolution::Confirmed => {
                        self.complete(entry, &payload).await?;
                        Ok(EntryOutcome::Confirmed)
                    }
                    Resolution::MissingRelation(retry_message)
                    | Resolution::Deferred(retry_message) => {
                        Ok(EntryOutcome::Deferred(retry_message))
                    }
                }
            }
            Resolution::Deferred(message) => Ok(EntryOutcome::Deferred(message)),
        }
    }

    async fn dispatch(
        &self,
        entry: &SyncQueueEntry,
        row: Value,
    ) -> std::result::Result<(), RemoteError> {
        match entry.operation {
            SyncOperation::Insert => self.remote.insert(entry.table, row).await,
            SyncOperation::Update => {
                let record_id = require_record_id(&row)?;
                self.remote.update(entry.table, &record_id, row).await
            }
            SyncOperation::Delete => {
                let record_id = require_record_id(&row)?;
                self.remote.delete(entry.table, &record_id).await
            }
        }
    }

    fn classify(
        &self,
        entry: &SyncQueueEntry,
        result: std::result::Result<(), RemoteError>,
    ) -> Resolution {
        match result {
            Ok(()) => Resolution::Confirmed,
            Err(err) => match err.kind {
                RemoteErrorKind::Duplicate => {
                    // Already applied remotely; idempotent no-op.
                    debug!(
                        "Sync entry {} recognized as duplicate, treating as success",
                        entry.id
                    );
                    Resolution::Confirmed
                }
                RemoteErrorKind::ForeignKeyViolation => {
                    Resolution::MissingRelation(err.message)
                }
                RemoteErrorKind::Transient | RemoteErrorKind::Unknown => {
                    Resolution::Deferred(err.message)
                }
            },
        }
    }

    async fn complete(&self, entry: &SyncQueueEntry, payload: &Value) -> Result<()> {
        self.queue.delete(entry.id).await?;
        if entry.table.carries_synced_flag() {
            if let Some(record_id) = payload.get("id").and_then(Value::as_str) {
                self.replica
                    .mark_synced(entry.table, record_id.to_string())
                    .await?;
            }
        }
        Ok(())
    }
}

fn require_record_id(row: &Value) -> std::result::Result<String, RemoteError> {
    row.get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            RemoteError::new(RemoteErrorKind::Unknown, "Payload is missing an 'id' field")
        })
}

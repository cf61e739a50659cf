//! Sync queue persistence.
//!
//! `enqueue_mutation` is called by every repository from inside its writer
//! transaction, so a local mutation and its queue entry commit as one unit.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::define_sql_function;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use cajaflow_core::errors::{DatabaseError, Error, Result};
use cajaflow_core::sync::{
    NewSyncQueueEntry, SyncOperation, SyncQueueEntry, SyncQueueRepositoryTrait, SyncTable,
};

use crate::convert::enum_to_db;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::sync_queue;

use super::{queue_entry_from_db, NewSyncQueueRow, SyncQueueEntryDB};

define_sql_function! { fn last_insert_rowid() -> diesel::sql_types::BigInt; }

/// Appends one queue entry for a logical mutation (never per field) and
/// returns its id. FIFO by insertion order; independent of connectivity.
pub fn enqueue_mutation(
    conn: &mut SqliteConnection,
    table: SyncTable,
    operation: SyncOperation,
    payload: &serde_json::Value,
) -> Result<i64> {
    let row = NewSyncQueueRow {
        tabla: enum_to_db(&table)?,
        operacion: enum_to_db(&operation)?,
        payload: payload.to_string(),
        timestamp: Utc::now().to_rfc3339(),
        intentos: 0,
        last_error: None,
    };
    diesel::insert_into(sync_queue::table)
        .values(&row)
        .execute(conn)
        .map_err(StorageError::from)?;
    let entry_id = diesel::select(last_insert_rowid())
        .get_result::<i64>(conn)
        .map_err(StorageError::from)?;
    Ok(entry_id)
}

pub struct SyncQueueRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SyncQueueRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl SyncQueueRepositoryTrait for SyncQueueRepository {
    async fn enqueue(&self, entry: NewSyncQueueEntry) -> Result<SyncQueueEntry> {
        self.writer
            .exec(move |conn| {
                let entry_id = enqueue_mutation(conn, entry.table, entry.operation, &entry.payload)?;
                let row = sync_queue::table
                    .find(entry_id)
                    .first::<SyncQueueEntryDB>(conn)
                    .map_err(StorageError::from)?;
                queue_entry_from_db(row)
            })
            .await
    }

    fn list_oldest_first(&self) -> Result<Vec<SyncQueueEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = sync_queue::table
            .order(sync_queue::id.asc())
            .load::<SyncQueueEntryDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(queue_entry_from_db).collect()
    }

    async fn delete(&self, entry_id: i64) -> Result<()> {
        self.writer
            .exec(move |conn| {
                let deleted = diesel::delete(sync_queue::table.find(entry_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if deleted == 0 {
                    return Err(Error::Database(DatabaseError::Internal(format!(
                        "Queue entry {entry_id} was already removed"
                    ))));
                }
                Ok(())
            })
            .await
    }

    async fn record_failure(&self, entry_id: i64, message: String) -> Result<()> {
        self.writer
            .exec(move |conn| {
                diesel::update(sync_queue::table.find(entry_id))
                    .set((
                        sync_queue::intentos.eq(sync_queue::intentos + 1),
                        sync_queue::last_error.eq(Some(message)),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    fn pending_count(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        sync_queue::table
            .select(count_star())
            .first(&mut conn)
            .map_err(StorageError::from)
            .map_err(Error::from)
    }
}

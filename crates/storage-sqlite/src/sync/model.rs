use diesel::prelude::*;

use cajaflow_core::sync::SyncQueueEntry;
use cajaflow_core::Result;

use crate::convert::enum_from_db;

#[derive(Queryable, Identifiable, Selectable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::sync_queue)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SyncQueueEntryDB {
    pub id: i64,
    pub tabla: String,
    pub operacion: String,
    pub payload: String,
    pub timestamp: String,
    pub intentos: i32,
    pub last_error: Option<String>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::sync_queue)]
pub struct NewSyncQueueRow {
    pub tabla: String,
    pub operacion: String,
    pub payload: String,
    pub timestamp: String,
    pub intentos: i32,
    pub last_error: Option<String>,
}

pub fn queue_entry_from_db(row: SyncQueueEntryDB) -> Result<SyncQueueEntry> {
    Ok(SyncQueueEntry {
        id: row.id,
        table: enum_from_db(&row.tabla)?,
        operation: enum_from_db(&row.operacion)?,
        payload: row.payload,
        timestamp: row.timestamp,
        attempts: row.intentos,
        last_error: row.last_error,
    })
}

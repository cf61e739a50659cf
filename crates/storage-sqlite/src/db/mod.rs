//! Database lifecycle: file placement, pooling, pragmas and embedded
//! migrations.
//!
//! Migrations are additive and ordered; each version restates the full table
//! set as of that version with `CREATE TABLE IF NOT EXISTS`, so every
//! installed instance converges by replaying versions in order.

pub mod write_actor;

pub use write_actor::{spawn_writer, WriteHandle};

use std::path::Path;
use std::sync::Arc;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::info;

use cajaflow_core::errors::{DatabaseError, Error, Result};

use crate::errors::StorageError;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

const DB_FILE: &str = "cajaflow.db";

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

#[derive(Debug)]
struct ConnectionOptions;

impl r2d2::CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), r2d2::Error> {
        conn.batch_execute(
            "PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;",
        )
        .map_err(r2d2::Error::QueryError)
    }
}

/// Ensures the app data directory exists and returns the database file path.
pub fn init(app_data_dir: &str) -> Result<String> {
    std::fs::create_dir_all(app_data_dir).map_err(|e| {
        Error::Database(DatabaseError::Internal(format!(
            "Failed to create app data directory: {e}"
        )))
    })?;
    let db_path = Path::new(app_data_dir).join(DB_FILE);
    Ok(db_path.to_string_lossy().to_string())
}

/// Replays pending schema versions in order.
pub fn run_migrations(db_path: &str) -> Result<()> {
    let mut conn = SqliteConnection::establish(db_path)
        .map_err(|e| Error::Database(DatabaseError::MigrationFailed(e.to_string())))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| Error::Database(DatabaseError::MigrationFailed(e.to_string())))?;
    if !applied.is_empty() {
        info!("Applied {} schema migration(s)", applied.len());
    }
    Ok(())
}

pub fn create_pool(db_path: &str) -> Result<Arc<DbPool>> {
    let manager = ConnectionManager::<SqliteConnection>::new(db_path);
    let pool = Pool::builder()
        .max_size(8)
        .connection_customizer(Box::new(ConnectionOptions))
        .build(manager)
        .map_err(|e| Error::Database(DatabaseError::PoolAcquisition(e.to_string())))?;
    Ok(Arc::new(pool))
}

pub fn get_connection(pool: &Arc<DbPool>) -> Result<DbConnection> {
    pool.get().map_err(StorageError::from).map_err(Error::from)
}

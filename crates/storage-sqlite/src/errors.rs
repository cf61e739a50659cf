//! Storage-level error type, folded into the core taxonomy at the boundary.

use cajaflow_core::errors::{DatabaseError, Error};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum StorageError {
    #[error("Database query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Stored value could not be decoded: {0}")]
    Decode(String),
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Query(e) => Error::Database(DatabaseError::QueryFailed(e.to_string())),
            StorageError::Pool(e) => {
                Error::Database(DatabaseError::PoolAcquisition(e.to_string()))
            }
            StorageError::Migration(message) => {
                Error::Database(DatabaseError::MigrationFailed(message))
            }
            StorageError::Decode(message) => Error::Database(DatabaseError::Internal(message)),
        }
    }
}

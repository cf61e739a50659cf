//! Error taxonomy shared across the workspace.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::sync::RemoteError;

/// Result type alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Input rejected before any mutation; never enqueued.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A referenced record is missing or a ledger invariant would break.
    #[error("Integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    /// Local store failure; the mutation and its queue entry roll back as one.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Remote datastore failure surfaced outside the sync engine (the engine
    /// itself converts these into pass-summary entries instead).
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Rejected synchronously before any state change.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Payment of {attempted} exceeds outstanding amount {outstanding}")]
    Overpayment {
        outstanding: Decimal,
        attempted: Decimal,
    },

    #[error("A transfer requires a destination box")]
    MissingDestinationBox,

    #[error("A transfer cannot use the same box as source and destination")]
    SameBoxTransfer,

    #[error("A loan requires two distinct boxes")]
    SelfLoan,

    #[error("Missing required relation '{0}'")]
    MissingRelation(&'static str),
}

/// A mutation that would leave the ledgers inconsistent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("Cash box '{0}' not found")]
    BoxNotFound(String),

    #[error("Debt record '{0}' not found")]
    DebtNotFound(String),

    #[error("Transaction '{0}' not found")]
    TransactionNotFound(String),

    #[error("Outstanding amount would become negative")]
    NegativeOutstanding,
}

/// Local persistence failures.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to acquire a connection from the pool: {0}")]
    PoolAcquisition(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Writer task is no longer running")]
    WriterUnavailable,

    #[error("{0}")]
    Internal(String),
}

impl Error {
    /// True when the caller's input was rejected before any mutation.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Integrity(_))
    }
}

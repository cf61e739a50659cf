//! Sync domain models and storage contracts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Local tables mirrored by the remote datastore.
///
/// The enum is closed on purpose: outbound projection, relation null-out and
/// the `sincronizado` flag are all selected by matching on it, so wiring a new
/// table is a compile-time-visible change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncTable {
    #[serde(rename = "empresas")]
    Companies,
    #[serde(rename = "proyectos")]
    Projects,
    #[serde(rename = "cajas")]
    CashBoxes,
    #[serde(rename = "terceros")]
    ThirdParties,
    #[serde(rename = "transacciones")]
    Transactions,
    #[serde(rename = "deudas_cajas")]
    InterBoxDebts,
    #[serde(rename = "deudas_terceros")]
    ThirdPartyDebts,
    #[serde(rename = "categorias")]
    Categories,
}

impl SyncTable {
    /// Every synced table, in foreign-key dependency order. The startup pull
    /// replaces tables in this order so parents land before children.
    pub const ALL: [SyncTable; 8] = [
        SyncTable::Companies,
        SyncTable::Projects,
        SyncTable::ThirdParties,
        SyncTable::Categories,
        SyncTable::CashBoxes,
        SyncTable::Transactions,
        SyncTable::InterBoxDebts,
        SyncTable::ThirdPartyDebts,
    ];

    /// Table name shared by the local store and the remote datastore.
    pub fn table_name(&self) -> &'static str {
        match self {
            SyncTable::Companies => "empresas",
            SyncTable::Projects => "proyectos",
            SyncTable::CashBoxes => "cajas",
            SyncTable::ThirdParties => "terceros",
            SyncTable::Transactions => "transacciones",
            SyncTable::InterBoxDebts => "deudas_cajas",
            SyncTable::ThirdPartyDebts => "deudas_terceros",
            SyncTable::Categories => "categorias",
        }
    }

    /// Whether local records of this table carry a `sincronizado` flag that
    /// must flip once the matching queue entry is confirmed.
    pub fn carries_synced_flag(&self) -> bool {
        matches!(self, SyncTable::Transactions)
    }
}

/// Mutation kinds propagated to the remote datastore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SyncOperation {
    Insert,
    Update,
    Delete,
}

/// One pending mutation, FIFO by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncQueueEntry {
    pub id: i64,
    pub table: SyncTable,
    pub operation: SyncOperation,
    /// Serialized snapshot of the record at mutation time.
    pub payload: String,
    pub timestamp: String,
    pub attempts: i32,
    pub last_error: Option<String>,
}

/// Queue entry before the store assigns its id.
#[derive(Debug, Clone)]
pub struct NewSyncQueueEntry {
    pub table: SyncTable,
    pub operation: SyncOperation,
    pub payload: serde_json::Value,
}

/// One unresolved failure from a `process_queue` pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncEntryError {
    pub entry_id: i64,
    pub table: SyncTable,
    pub operation: SyncOperation,
    pub message: String,
}

/// Outcome of one full queue pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    /// True iff no entry produced an unresolved error this pass.
    pub success: bool,
    pub synced_count: usize,
    pub errors: Vec<SyncEntryError>,
}

impl SyncSummary {
    pub fn empty() -> Self {
        Self {
            success: true,
            synced_count: 0,
            errors: Vec::new(),
        }
    }
}

/// Report of a startup pull from the remote source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapReport {
    pub tables: usize,
    pub rows: usize,
}

/// Durable FIFO of pending mutations.
#[async_trait]
pub trait SyncQueueRepositoryTrait: Send + Sync {
    /// Appends one entry; independent of current connectivity.
    async fn enqueue(&self, entry: NewSyncQueueEntry) -> Result<SyncQueueEntry>;

    /// All pending entries, oldest first.
    fn list_oldest_first(&self) -> Result<Vec<SyncQueueEntry>>;

    /// Removes a confirmed (or recognized-duplicate) entry.
    async fn delete(&self, entry_id: i64) -> Result<()>;

    /// Records a failed dispatch on the entry; the entry stays queued.
    async fn record_failure(&self, entry_id: i64, message: String) -> Result<()>;

    /// Queue depth, surfaced as the pending-sync counter.
    fn pending_count(&self) -> Result<i64>;
}

/// Local-replica maintenance hooks used by the sync engine.
#[async_trait]
pub trait SyncReplicaTrait: Send + Sync {
    /// Flips the local `sincronizado` flag after remote confirmation.
    async fn mark_synced(&self, table: SyncTable, record_id: String) -> Result<()>;

    /// Replaces the local contents of every listed table with the pulled rows
    /// (full replace, not merge, so devices never accumulate duplicates).
    /// All tables commit as one unit; a half-replaced replica is never
    /// observable.
    async fn replace_all(
        &self,
        tables: Vec<(SyncTable, Vec<serde_json::Value>)>,
    ) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_table_serialization_matches_table_names() {
        for table in SyncTable::ALL {
            let serialized = serde_json::to_string(&table).expect("serialize sync table");
            assert_eq!(serialized, format!("\"{}\"", table.table_name()));
        }
    }

    #[test]
    fn only_transactions_carry_the_synced_flag() {
        for table in SyncTable::ALL {
            assert_eq!(
                table.carries_synced_flag(),
                table == SyncTable::Transactions
            );
        }
    }

    #[test]
    fn dependency_order_puts_parents_before_children() {
        let order: Vec<&str> = SyncTable::ALL.iter().map(|t| t.table_name()).collect();
        let pos = |name: &str| order.iter().position(|t| *t == name).unwrap();
        assert!(pos("empresas") < pos("cajas"));
        assert!(pos("cajas") < pos("transacciones"));
        assert!(pos("cajas") < pos("deudas_cajas"));
        assert!(pos("terceros") < pos("deudas_terceros"));
    }
}

use async_trait::async_trait;

use crate::Result;

use super::{NewTransaction, Transaction};

/// Store access for transactions.
///
/// Every mutation commits its balance effects and its sync queue entry in the
/// same unit as the row change; a failure leaves no partial state behind.
#[async_trait]
pub trait TransactionRepositoryTrait: Send + Sync {
    fn get(&self, transaction_id: &str) -> Result<Transaction>;

    fn list(&self) -> Result<Vec<Transaction>>;

    /// Inserts the transaction and applies its effects (`+1`).
    async fn insert(&self, new_transaction: NewTransaction) -> Result<Transaction>;

    /// Replaces the stored record: reverses the original's effects, applies
    /// the updated record's effects, resets the synced flag.
    async fn update(&self, updated: Transaction) -> Result<Transaction>;

    /// Removes the record and reverses its effects (`-1`).
    async fn delete(&self, transaction_id: &str) -> Result<()>;

    /// Authoritative rebuild: zeroes every box balance and folds every stored
    /// transaction's effect exactly once. Returns the number of boxes
    /// rewritten.
    async fn recalc_balances(&self) -> Result<usize>;
}

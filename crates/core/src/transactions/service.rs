//! Transaction workflows: validate, mutate atomically, nudge the sync worker.

use std::sync::Arc;

use log::debug;

use crate::sync::SyncTrigger;
use crate::Result;

use super::{NewTransaction, Transaction, TransactionRepositoryTrait};

#[derive(Clone)]
pub struct TransactionService {
    repository: Arc<dyn TransactionRepositoryTrait>,
    sync: Arc<dyn SyncTrigger>,
}

impl TransactionService {
    pub fn new(repository: Arc<dyn TransactionRepositoryTrait>, sync: Arc<dyn SyncTrigger>) -> Self {
        Self { repository, sync }
    }

    pub fn get(&self, transaction_id: &str) -> Result<Transaction> {
        self.repository.get(transaction_id)
    }

    pub fn list(&self) -> Result<Vec<Transaction>> {
        self.repository.list()
    }

    pub async fn create(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        new_transaction.validate()?;
        let transaction = self.repository.insert(new_transaction).await?;
        debug!("Created transaction {}", transaction.id);
        self.sync.trigger();
        Ok(transaction)
    }

    pub async fn update(&self, updated: Transaction) -> Result<Transaction> {
        updated.validate()?;
        let transaction = self.repository.update(updated).await?;
        self.sync.trigger();
        Ok(transaction)
    }

    pub async fn delete(&self, transaction_id: &str) -> Result<()> {
        self.repository.delete(transaction_id).await?;
        self.sync.trigger();
        Ok(())
    }

    /// Local integrity repair; derived balances produce no queue entries.
    pub async fn recalc_balances(&self) -> Result<usize> {
        self.repository.recalc_balances().await
    }
}

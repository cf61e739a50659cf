use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use uuid::Uuid;

use cajaflow_core::errors::{Error, IntegrityError, Result};
use cajaflow_core::sync::{SyncOperation, SyncTable};
use cajaflow_core::transactions::{
    edit_effects, effects_for, fold_balances, EffectSign, NewTransaction, Transaction,
    TransactionRepositoryTrait,
};

use crate::boxes::apply_balance_effects;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{cajas, transacciones};
use crate::sync::enqueue_mutation;

use super::{transaction_from_db, transaction_to_db, TransactionDB};

pub(crate) fn load_transaction(
    conn: &mut SqliteConnection,
    transaction_id: &str,
) -> Result<Transaction> {
    let row = transacciones::table
        .find(transaction_id)
        .first::<TransactionDB>(conn)
        .optional()
        .map_err(StorageError::from)?;
    row.map(transaction_from_db).transpose()?.ok_or_else(|| {
        Error::Integrity(IntegrityError::TransactionNotFound(
            transaction_id.to_string(),
        ))
    })
}

/// Inserts a transaction, applies its balance effects and appends its queue
/// entry, all inside the caller's writer transaction. Shared with the debt
/// repository for synthesized loan-payment transfers.
pub(crate) fn insert_transaction_with_effects(
    conn: &mut SqliteConnection,
    new_transaction: NewTransaction,
) -> Result<Transaction> {
    let transaction =
        new_transaction.into_transaction(Uuid::new_v4().to_string(), Utc::now().to_rfc3339());
    apply_balance_effects(conn, &effects_for(&transaction, EffectSign::Apply))?;
    diesel::insert_into(transacciones::table)
        .values(&transaction_to_db(&transaction)?)
        .execute(conn)
        .map_err(StorageError::from)?;
    enqueue_mutation(
        conn,
        SyncTable::Transactions,
        SyncOperation::Insert,
        &serde_json::to_value(&transaction)?,
    )?;
    Ok(transaction)
}

pub struct TransactionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl TransactionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl TransactionRepositoryTrait for TransactionRepository {
    fn get(&self, transaction_id: &str) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;
        load_transaction(&mut conn, transaction_id)
    }

    fn list(&self) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = transacciones::table
            .order((transacciones::fecha.desc(), transacciones::created_at.desc()))
            .load::<TransactionDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(transaction_from_db).collect()
    }

    async fn insert(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        self.writer
            .exec(move |conn| insert_transaction_with_effects(conn, new_transaction))
            .await
    }

    async fn update(&self, updated: Transaction) -> Result<Transaction> {
        self.writer
            .exec(move |conn| {
                let original = load_transaction(conn, &updated.id)?;
                // Full reversal of the original, then full application of the
                // updated record; the box identities may differ between them.
                apply_balance_effects(conn, &edit_effects(&original, &updated))?;

                let mut updated = updated;
                updated.synced = false;
                diesel::update(transacciones::table.find(&updated.id))
                    .set(&transaction_to_db(&updated)?)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                enqueue_mutation(
                    conn,
                    SyncTable::Transactions,
                    SyncOperation::Update,
                    &serde_json::to_value(&updated)?,
                )?;
                Ok(updated)
            })
            .await
    }

    async fn delete(&self, transaction_id: &str) -> Result<()> {
        let transaction_id = transaction_id.to_string();
        self.writer
            .exec(move |conn| {
                let original = load_transaction(conn, &transaction_id)?;
                apply_balance_effects(conn, &effects_for(&original, EffectSign::Reverse))?;
                diesel::delete(transacciones::table.find(&transaction_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                enqueue_mutation(
                    conn,
                    SyncTable::Transactions,
                    SyncOperation::Delete,
                    &serde_json::json!({ "id": transaction_id }),
                )?;
                Ok(())
            })
            .await
    }

    async fn recalc_balances(&self) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                let rows = transacciones::table
                    .load::<TransactionDB>(conn)
                    .map_err(StorageError::from)?;
                let transactions = rows
                    .into_iter()
                    .map(transaction_from_db)
                    .collect::<Result<Vec<_>>>()?;
                let balances = fold_balances(&transactions);

                let box_ids = cajas::table
                    .select(cajas::id)
                    .load::<String>(conn)
                    .map_err(StorageError::from)?;
                let now = Utc::now().to_rfc3339();
                for box_id in &box_ids {
                    let balance = balances.get(box_id).copied().unwrap_or(Decimal::ZERO);
                    diesel::update(cajas::table.find(box_id))
                        .set((
                            cajas::saldo_actual.eq(balance.to_string()),
                            cajas::updated_at.eq(now.clone()),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(box_ids.len())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use cajaflow_core::transactions::MovementType;

    use crate::test_support::{queue_depth, seed_box, setup_db};

    fn expense(amount: Decimal, source: &str) -> NewTransaction {
        NewTransaction {
            date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            description: "compra de insumos".to_string(),
            amount,
            movement_type: MovementType::Expense,
            category: "insumos".to_string(),
            project_id: None,
            source_box_id: source.to_string(),
            dest_box_id: None,
            third_party_id: None,
            support_ref: None,
        }
    }

    fn transfer(amount: Decimal, source: &str, dest: &str) -> NewTransaction {
        NewTransaction {
            movement_type: MovementType::Transfer,
            dest_box_id: Some(dest.to_string()),
            category: "traslados".to_string(),
            ..expense(amount, source)
        }
    }

    fn income(amount: Decimal, source: &str) -> NewTransaction {
        NewTransaction {
            movement_type: MovementType::Income,
            category: "ventas".to_string(),
            ..expense(amount, source)
        }
    }

    fn box_balance(pool: &Arc<DbPool>, box_id: &str) -> Decimal {
        let mut conn = get_connection(pool).expect("conn");
        let raw: String = cajas::table
            .find(box_id)
            .select(cajas::saldo_actual)
            .first(&mut conn)
            .expect("balance");
        raw.parse().expect("decimal")
    }

    #[tokio::test]
    async fn expense_debits_the_box_and_queues_one_entry() {
        let (pool, writer) = setup_db();
        seed_box(&pool, "caja-a", dec!(100000));
        let repo = TransactionRepository::new(pool.clone(), writer);

        let tx = repo.insert(expense(dec!(30000), "caja-a")).await.unwrap();
        assert!(!tx.synced);
        assert_eq!(box_balance(&pool, "caja-a"), dec!(70000));
        assert_eq!(queue_depth(&pool), 1);
    }

    #[tokio::test]
    async fn insert_against_a_missing_box_leaves_no_partial_state() {
        let (pool, writer) = setup_db();
        let repo = TransactionRepository::new(pool.clone(), writer);

        let result = repo.insert(expense(dec!(30000), "caja-fantasma")).await;
        assert!(matches!(
            result,
            Err(Error::Integrity(IntegrityError::BoxNotFound(_)))
        ));
        assert_eq!(queue_depth(&pool), 0);
        assert!(repo.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn editing_a_transfer_reverses_then_reapplies() {
        let (pool, writer) = setup_db();
        seed_box(&pool, "caja-a", dec!(100000));
        seed_box(&pool, "caja-b", dec!(0));
        let repo = TransactionRepository::new(pool.clone(), writer);

        let tx = repo
            .insert(transfer(dec!(10000), "caja-a", "caja-b"))
            .await
            .unwrap();
        assert_eq!(box_balance(&pool, "caja-a"), dec!(90000));
        assert_eq!(box_balance(&pool, "caja-b"), dec!(10000));

        let mut updated = tx;
        updated.amount = dec!(15000);
        let updated = repo.update(updated).await.unwrap();
        assert!(!updated.synced);
        // Net effect of reversal + reapplication, not a naive diff.
        assert_eq!(box_balance(&pool, "caja-a"), dec!(85000));
        assert_eq!(box_balance(&pool, "caja-b"), dec!(15000));
        assert_eq!(queue_depth(&pool), 2);
    }

    #[tokio::test]
    async fn editing_can_move_the_destination_box() {
        let (pool, writer) = setup_db();
        seed_box(&pool, "caja-a", dec!(50000));
        seed_box(&pool, "caja-b", dec!(0));
        seed_box(&pool, "caja-c", dec!(0));
        let repo = TransactionRepository::new(pool.clone(), writer);

        let tx = repo
            .insert(transfer(dec!(10000), "caja-a", "caja-b"))
            .await
            .unwrap();
        let mut updated = tx;
        updated.dest_box_id = Some("caja-c".to_string());
        repo.update(updated).await.unwrap();

        assert_eq!(box_balance(&pool, "caja-a"), dec!(40000));
        assert_eq!(box_balance(&pool, "caja-b"), dec!(0));
        assert_eq!(box_balance(&pool, "caja-c"), dec!(10000));
    }

    #[tokio::test]
    async fn delete_reverses_the_effect() {
        let (pool, writer) = setup_db();
        seed_box(&pool, "caja-a", dec!(100000));
        let repo = TransactionRepository::new(pool.clone(), writer);

        let tx = repo.insert(expense(dec!(30000), "caja-a")).await.unwrap();
        repo.delete(&tx.id).await.unwrap();
        assert_eq!(box_balance(&pool, "caja-a"), dec!(100000));
        assert!(repo.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn recalc_matches_incrementally_maintained_balances() {
        let (pool, writer) = setup_db();
        seed_box(&pool, "caja-a", dec!(0));
        seed_box(&pool, "caja-b", dec!(0));
        let repo = TransactionRepository::new(pool.clone(), writer);

        repo.insert(income(dec!(100), "caja-a")).await.unwrap();
        repo.insert(expense(dec!(40), "caja-a")).await.unwrap();
        repo.insert(transfer(dec!(20), "caja-a", "caja-b"))
            .await
            .unwrap();
        assert_eq!(box_balance(&pool, "caja-a"), dec!(40));
        assert_eq!(box_balance(&pool, "caja-b"), dec!(20));

        // Corrupt a balance, then let the authoritative rebuild repair it.
        {
            let mut conn = get_connection(&pool).expect("conn");
            diesel::update(cajas::table.find("caja-a"))
                .set(cajas::saldo_actual.eq("999999"))
                .execute(&mut conn)
                .expect("corrupt");
        }
        let rewritten = repo.recalc_balances().await.unwrap();
        assert_eq!(rewritten, 2);
        assert_eq!(box_balance(&pool, "caja-a"), dec!(40));
        assert_eq!(box_balance(&pool, "caja-b"), dec!(20));
    }
}

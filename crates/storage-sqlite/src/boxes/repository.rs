use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use uuid::Uuid;

use cajaflow_core::boxes::{CashBox, CashBoxRepositoryTrait, NewCashBox};
use cajaflow_core::errors::{Error, IntegrityError, Result};
use cajaflow_core::sync::{SyncOperation, SyncTable};
use cajaflow_core::transactions::BalanceEffect;

use crate::convert::parse_amount;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::cajas;
use crate::sync::enqueue_mutation;

use super::{cash_box_from_db, cash_box_to_db, CashBoxDB};

/// Loads a box inside the current writer transaction.
pub(crate) fn load_cash_box(conn: &mut SqliteConnection, box_id: &str) -> Result<CashBox> {
    let row = cajas::table
        .find(box_id)
        .first::<CashBoxDB>(conn)
        .optional()
        .map_err(StorageError::from)?;
    row.map(cash_box_from_db)
        .transpose()?
        .ok_or_else(|| Error::Integrity(IntegrityError::BoxNotFound(box_id.to_string())))
}

/// Applies balance deltas to the implicated boxes.
///
/// Runs inside the writer transaction of the mutation that produced the
/// effects: the read-modify-write is atomic with the row change, and a
/// missing box rolls the whole unit back.
pub(crate) fn apply_balance_effects(
    conn: &mut SqliteConnection,
    effects: &[BalanceEffect],
) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    for effect in effects {
        let row = cajas::table
            .find(&effect.box_id)
            .first::<CashBoxDB>(conn)
            .optional()
            .map_err(StorageError::from)?
            .ok_or_else(|| Error::Integrity(IntegrityError::BoxNotFound(effect.box_id.clone())))?;
        let balance = parse_amount(&row.saldo_actual)? + effect.delta;
        diesel::update(cajas::table.find(&effect.box_id))
            .set((
                cajas::saldo_actual.eq(balance.to_string()),
                cajas::updated_at.eq(now.clone()),
            ))
            .execute(conn)
            .map_err(StorageError::from)?;
    }
    Ok(())
}

pub struct CashBoxRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl CashBoxRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl CashBoxRepositoryTrait for CashBoxRepository {
    fn get(&self, box_id: &str) -> Result<CashBox> {
        let mut conn = get_connection(&self.pool)?;
        load_cash_box(&mut conn, box_id)
    }

    fn list(&self) -> Result<Vec<CashBox>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = cajas::table
            .order(cajas::nombre.asc())
            .load::<CashBoxDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(cash_box_from_db).collect()
    }

    async fn insert(&self, new_box: NewCashBox) -> Result<CashBox> {
        self.writer
            .exec(move |conn| {
                let now = Utc::now().to_rfc3339();
                let cash_box = CashBox {
                    id: Uuid::new_v4().to_string(),
                    name: new_box.name,
                    box_type: new_box.box_type,
                    company_id: new_box.company_id,
                    balance: new_box.initial_balance,
                    bank_name: new_box.bank_name,
                    account_number: new_box.account_number,
                    created_at: now.clone(),
                    updated_at: now,
                };
                diesel::insert_into(cajas::table)
                    .values(&cash_box_to_db(&cash_box))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                enqueue_mutation(
                    conn,
                    SyncTable::CashBoxes,
                    SyncOperation::Insert,
                    &serde_json::to_value(&cash_box)?,
                )?;
                Ok(cash_box)
            })
            .await
    }
}

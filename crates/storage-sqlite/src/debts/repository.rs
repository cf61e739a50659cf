use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use uuid::Uuid;

use cajaflow_core::debts::{
    apply_payment_inter_box, apply_payment_third_party, DebtState, InterBoxDebt,
    InterBoxDebtRepositoryTrait, InterBoxPaymentReceipt, NewInterBoxDebt, NewThirdPartyDebt,
    PaymentInput, ThirdPartyDebt, ThirdPartyDebtRepositoryTrait,
};
use cajaflow_core::errors::{Error, IntegrityError, Result};
use cajaflow_core::sync::{SyncOperation, SyncTable};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{deudas_cajas, deudas_terceros};
use crate::sync::enqueue_mutation;
use crate::transactions::insert_transaction_with_effects;

use super::{
    inter_box_debt_from_db, inter_box_debt_to_db, third_party_debt_from_db, third_party_debt_to_db,
    InterBoxDebtDB, ThirdPartyDebtDB,
};

fn load_inter_box_debt(conn: &mut SqliteConnection, debt_id: &str) -> Result<InterBoxDebt> {
    let row = deudas_cajas::table
        .find(debt_id)
        .first::<InterBoxDebtDB>(conn)
        .optional()
        .map_err(StorageError::from)?;
    row.map(inter_box_debt_from_db)
        .transpose()?
        .ok_or_else(|| Error::Integrity(IntegrityError::DebtNotFound(debt_id.to_string())))
}

fn load_third_party_debt(conn: &mut SqliteConnection, debt_id: &str) -> Result<ThirdPartyDebt> {
    let row = deudas_terceros::table
        .find(debt_id)
        .first::<ThirdPartyDebtDB>(conn)
        .optional()
        .map_err(StorageError::from)?;
    row.map(third_party_debt_from_db)
        .transpose()?
        .ok_or_else(|| Error::Integrity(IntegrityError::DebtNotFound(debt_id.to_string())))
}

pub struct InterBoxDebtRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl InterBoxDebtRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl InterBoxDebtRepositoryTrait for InterBoxDebtRepository {
    fn get(&self, debt_id: &str) -> Result<InterBoxDebt> {
        let mut conn = get_connection(&self.pool)?;
        load_inter_box_debt(&mut conn, debt_id)
    }

    fn list(&self) -> Result<Vec<InterBoxDebt>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = deudas_cajas::table
            .order(deudas_cajas::created_at.desc())
            .load::<InterBoxDebtDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(inter_box_debt_from_db).collect()
    }

    async fn insert(&self, new_debt: NewInterBoxDebt) -> Result<InterBoxDebt> {
        self.writer
            .exec(move |conn| {
                let debt = InterBoxDebt {
                    id: Uuid::new_v4().to_string(),
                    debtor_box_id: new_debt.debtor_box_id,
                    creditor_box_id: new_debt.creditor_box_id,
                    original_amount: new_debt.original_amount,
                    outstanding_amount: new_debt.original_amount,
                    loan_date: new_debt.loan_date,
                    state: DebtState::Pendiente,
                    payments: Vec::new(),
                    description: new_debt.description,
                    created_at: Utc::now().to_rfc3339(),
                };
                diesel::insert_into(deudas_cajas::table)
                    .values(&inter_box_debt_to_db(&debt)?)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                enqueue_mutation(
                    conn,
                    SyncTable::InterBoxDebts,
                    SyncOperation::Insert,
                    &serde_json::to_value(&debt)?,
                )?;
                Ok(debt)
            })
            .await
    }

    async fn record_payment(
        &self,
        debt_id: &str,
        input: PaymentInput,
    ) -> Result<InterBoxPaymentReceipt> {
        let debt_id = debt_id.to_string();
        self.writer
            .exec(move |conn| {
                let debt = load_inter_box_debt(conn, &debt_id)?;
                // A rejected payment returns here before anything is written.
                let (updated, payment) = apply_payment_inter_box(&debt, &input)?;

                // The real cash movement behind the payment: a transfer from
                // debtor to creditor, routed through the balance ledger and
                // committed in the same unit as the debt update.
                let transfer =
                    insert_transaction_with_effects(conn, updated.transfer_for_payment(&payment))?;

                diesel::update(deudas_cajas::table.find(&updated.id))
                    .set(&inter_box_debt_to_db(&updated)?)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                enqueue_mutation(
                    conn,
                    SyncTable::InterBoxDebts,
                    SyncOperation::Update,
                    &serde_json::to_value(&updated)?,
                )?;

                Ok(InterBoxPaymentReceipt {
                    debt: updated,
                    transfer,
                })
            })
            .await
    }

    async fn delete(&self, debt_id: &str) -> Result<()> {
        let debt_id = debt_id.to_string();
        self.writer
            .exec(move |conn| {
                // Unconditional: transactions synthesized by past payments
                // stay applied.
                let deleted = diesel::delete(deudas_cajas::table.find(&debt_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if deleted > 0 {
                    enqueue_mutation(
                        conn,
                        SyncTable::InterBoxDebts,
                        SyncOperation::Delete,
                        &serde_json::json!({ "id": debt_id }),
                    )?;
                }
                Ok(())
            })
            .await
    }
}

pub struct ThirdPartyDebtRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ThirdPartyDebtRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl ThirdPartyDebtRepositoryTrait for ThirdPartyDebtRepository {
    fn get(&self, debt_id: &str) -> Result<ThirdPartyDebt> {
        let mut conn = get_connection(&self.pool)?;
        load_third_party_debt(&mut conn, debt_id)
    }

    fn list(&self) -> Result<Vec<ThirdPartyDebt>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = deudas_terceros::table
            .order(deudas_terceros::created_at.desc())
            .load::<ThirdPartyDebtDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(third_party_debt_from_db).collect()
    }

    async fn insert(&self, new_debt: NewThirdPartyDebt) -> Result<ThirdPartyDebt> {
        self.writer
            .exec(move |conn| {
                let debt = ThirdPartyDebt {
                    id: Uuid::new_v4().to_string(),
                    third_party_id: new_debt.third_party_id,
                    company_id: new_debt.company_id,
                    project_id: new_debt.project_id,
                    original_amount: new_debt.original_amount,
                    outstanding_amount: new_debt.original_amount,
                    debt_date: new_debt.debt_date,
                    state: DebtState::Pendiente,
                    description: new_debt.description,
                    payments: Vec::new(),
                    created_at: Utc::now().to_rfc3339(),
                };
                diesel::insert_into(deudas_terceros::table)
                    .values(&third_party_debt_to_db(&debt)?)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                enqueue_mutation(
                    conn,
                    SyncTable::ThirdPartyDebts,
                    SyncOperation::Insert,
                    &serde_json::to_value(&debt)?,
                )?;
                Ok(debt)
            })
            .await
    }

    async fn record_payment(&self, debt_id: &str, input: PaymentInput) -> Result<ThirdPartyDebt> {
        let debt_id = debt_id.to_string();
        self.writer
            .exec(move |conn| {
                let debt = load_third_party_debt(conn, &debt_id)?;
                // Ledger-only: any box reference in the input is stored as a
                // memo, no balance effect.
                let (updated, _payment) = apply_payment_third_party(&debt, &input)?;

                diesel::update(deudas_terceros::table.find(&updated.id))
                    .set(&third_party_debt_to_db(&updated)?)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                enqueue_mutation(
                    conn,
                    SyncTable::ThirdPartyDebts,
                    SyncOperation::Update,
                    &serde_json::to_value(&updated)?,
                )?;
                Ok(updated)
            })
            .await
    }

    async fn delete(&self, debt_id: &str) -> Result<()> {
        let debt_id = debt_id.to_string();
        self.writer
            .exec(move |conn| {
                let deleted = diesel::delete(deudas_terceros::table.find(&debt_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if deleted > 0 {
                    enqueue_mutation(
                        conn,
                        SyncTable::ThirdPartyDebts,
                        SyncOperation::Delete,
                        &serde_json::json!({ "id": debt_id }),
                    )?;
                }
                Ok(())
            })
            .await
    }
}

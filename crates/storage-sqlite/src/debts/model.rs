use chrono::NaiveDate;
use diesel::prelude::*;

use cajaflow_core::debts::{InterBoxDebt, ThirdPartyDebt};
use cajaflow_core::Result;

use crate::convert::{enum_from_db, enum_to_db, parse_amount, parse_payments};

#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone, PartialEq, Eq,
)]
#[diesel(table_name = crate::schema::deudas_cajas)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InterBoxDebtDB {
    pub id: String,
    pub caja_deudora_id: String,
    pub caja_acreedora_id: String,
    pub monto_original: String,
    pub monto_pendiente: String,
    pub fecha_prestamo: NaiveDate,
    pub estado: String,
    pub pagos: String,
    pub descripcion: Option<String>,
    pub created_at: String,
}

#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone, PartialEq, Eq,
)]
#[diesel(table_name = crate::schema::deudas_terceros)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ThirdPartyDebtDB {
    pub id: String,
    pub tercero_id: String,
    pub empresa_id: Option<String>,
    pub proyecto_id: Option<String>,
    pub monto_original: String,
    pub monto_pendiente: String,
    pub fecha_deuda: NaiveDate,
    pub estado: String,
    pub descripcion: String,
    pub pagos: String,
    pub created_at: String,
}

pub fn inter_box_debt_from_db(row: InterBoxDebtDB) -> Result<InterBoxDebt> {
    Ok(InterBoxDebt {
        id: row.id,
        debtor_box_id: row.caja_deudora_id,
        creditor_box_id: row.caja_acreedora_id,
        original_amount: parse_amount(&row.monto_original)?,
        outstanding_amount: parse_amount(&row.monto_pendiente)?,
        loan_date: row.fecha_prestamo,
        state: enum_from_db(&row.estado)?,
        payments: parse_payments(&row.pagos)?,
        description: row.descripcion,
        created_at: row.created_at,
    })
}

pub fn inter_box_debt_to_db(debt: &InterBoxDebt) -> Result<InterBoxDebtDB> {
    Ok(InterBoxDebtDB {
        id: debt.id.clone(),
        caja_deudora_id: debt.debtor_box_id.clone(),
        caja_acreedora_id: debt.creditor_box_id.clone(),
        monto_original: debt.original_amount.to_string(),
        monto_pendiente: debt.outstanding_amount.to_string(),
        fecha_prestamo: debt.loan_date,
        estado: enum_to_db(&debt.state)?,
        pagos: serde_json::to_string(&debt.payments)?,
        descripcion: debt.description.clone(),
        created_at: debt.created_at.clone(),
    })
}

pub fn third_party_debt_from_db(row: ThirdPartyDebtDB) -> Result<ThirdPartyDebt> {
    Ok(ThirdPartyDebt {
        id: row.id,
        third_party_id: row.tercero_id,
        company_id: row.empresa_id,
        project_id: row.proyecto_id,
        original_amount: parse_amount(&row.monto_original)?,
        outstanding_amount: parse_amount(&row.monto_pendiente)?,
        debt_date: row.fecha_deuda,
        state: enum_from_db(&row.estado)?,
        description: row.descripcion,
        payments: parse_payments(&row.pagos)?,
        created_at: row.created_at,
    })
}

pub fn third_party_debt_to_db(debt: &ThirdPartyDebt) -> Result<ThirdPartyDebtDB> {
    Ok(ThirdPartyDebtDB {
        id: debt.id.clone(),
        tercero_id: debt.third_party_id.clone(),
        empresa_id: debt.company_id.clone(),
        proyecto_id: debt.project_id.clone(),
        monto_original: debt.original_amount.to_string(),
        monto_pendiente: debt.outstanding_amount.to_string(),
        fecha_deuda: debt.debt_date,
        estado: enum_to_db(&debt.state)?,
        descripcion: debt.description.clone(),
        pagos: serde_json::to_string(&debt.payments)?,
        created_at: debt.created_at.clone(),
    })
}

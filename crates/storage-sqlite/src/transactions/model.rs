use chrono::NaiveDate;
use diesel::prelude::*;

use cajaflow_core::transactions::Transaction;
use cajaflow_core::Result;

use crate::convert::{enum_from_db, enum_to_db, parse_amount};

#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone, PartialEq, Eq,
)]
#[diesel(table_name = crate::schema::transacciones)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub fecha: NaiveDate,
    pub descripcion: String,
    pub monto: String,
    pub tipo_movimiento: String,
    pub categoria: String,
    pub proyecto_id: Option<String>,
    pub caja_origen_id: String,
    pub caja_destino_id: Option<String>,
    pub tercero_id: Option<String>,
    pub soporte_url: Option<String>,
    pub sincronizado: bool,
    pub created_at: String,
}

pub fn transaction_from_db(row: TransactionDB) -> Result<Transaction> {
    Ok(Transaction {
        id: row.id,
        date: row.fecha,
        description: row.descripcion,
        amount: parse_amount(&row.monto)?,
        movement_type: enum_from_db(&row.tipo_movimiento)?,
        category: row.categoria,
        project_id: row.proyecto_id,
        source_box_id: row.caja_origen_id,
        dest_box_id: row.caja_destino_id,
        third_party_id: row.tercero_id,
        support_ref: row.soporte_url,
        synced: row.sincronizado,
        created_at: row.created_at,
    })
}

pub fn transaction_to_db(tx: &Transaction) -> Result<TransactionDB> {
    Ok(TransactionDB {
        id: tx.id.clone(),
        fecha: tx.date,
        descripcion: tx.description.clone(),
        monto: tx.amount.to_string(),
        tipo_movimiento: enum_to_db(&tx.movement_type)?,
        categoria: tx.category.clone(),
        proyecto_id: tx.project_id.clone(),
        caja_origen_id: tx.source_box_id.clone(),
        caja_destino_id: tx.dest_box_id.clone(),
        tercero_id: tx.third_party_id.clone(),
        soporte_url: tx.support_ref.clone(),
        sincronizado: tx.synced,
        created_at: tx.created_at.clone(),
    })
}

use cajaflow_core::boxes::CashBox;
use cajaflow_core::Result;
use diesel::prelude::*;

use crate::convert::parse_amount;

#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone, PartialEq, Eq,
)]
#[diesel(table_name = crate::schema::cajas)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CashBoxDB {
    pub id: String,
    pub nombre: String,
    pub tipo: String,
    pub empresa_id: Option<String>,
    pub saldo_actual: String,
    pub banco_nombre: Option<String>,
    pub numero_cuenta: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub fn cash_box_from_db(row: CashBoxDB) -> Result<CashBox> {
    Ok(CashBox {
        id: row.id,
        name: row.nombre,
        box_type: row.tipo,
        company_id: row.empresa_id,
        balance: parse_amount(&row.saldo_actual)?,
        bank_name: row.banco_nombre,
        account_number: row.numero_cuenta,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub fn cash_box_to_db(cash_box: &CashBox) -> CashBoxDB {
    CashBoxDB {
        id: cash_box.id.clone(),
        nombre: cash_box.name.clone(),
        tipo: cash_box.box_type.clone(),
        empresa_id: cash_box.company_id.clone(),
        saldo_actual: cash_box.balance.to_string(),
        banco_nombre: cash_box.bank_name.clone(),
        numero_cuenta: cash_box.account_number.clone(),
        created_at: cash_box.created_at.clone(),
        updated_at: cash_box.updated_at.clone(),
    }
}

//! Cash box model.
//!
//! Serde field names follow the shared local/remote schema, so a serialized
//! box is directly usable as a sync queue payload snapshot.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A named account with a tracked running balance.
///
/// The balance is derived state: it must always equal the fold of every
/// applied transaction effect referencing the box. It is only ever mutated
/// through the balance ledger, never set directly by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashBox {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub box_type: String,
    #[serde(rename = "empresa_id")]
    pub company_id: Option<String>,
    #[serde(rename = "saldo_actual")]
    pub balance: Decimal,
    #[serde(rename = "banco_nombre")]
    pub bank_name: Option<String>,
    #[serde(rename = "numero_cuenta")]
    pub account_number: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Cash box before the store assigns its id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCashBox {
    pub name: String,
    pub box_type: String,
    pub company_id: Option<String>,
    pub initial_balance: Decimal,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
}

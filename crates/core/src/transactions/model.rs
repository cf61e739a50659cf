//! Transaction model.
//!
//! Serde field names follow the shared local/remote schema, so a serialized
//! transaction is directly usable as a sync queue payload snapshot.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::Result;

/// Classification of a transaction's cash effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementType {
    #[serde(rename = "ingreso")]
    Income,
    #[serde(rename = "gasto")]
    Expense,
    #[serde(rename = "transferencia")]
    Transfer,
}

/// A cash movement. Mutated only via edit (reverse + reapply) or delete
/// (reverse); the balance ledger owns every effect it has on box balances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "fecha")]
    pub date: NaiveDate,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "monto")]
    pub amount: Decimal,
    #[serde(rename = "tipo_movimiento")]
    pub movement_type: MovementType,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "proyecto_id")]
    pub project_id: Option<String>,
    #[serde(rename = "caja_origen_id")]
    pub source_box_id: String,
    #[serde(rename = "caja_destino_id")]
    pub dest_box_id: Option<String>,
    #[serde(rename = "tercero_id")]
    pub third_party_id: Option<String>,
    #[serde(rename = "soporte_url")]
    pub support_ref: Option<String>,
    /// True only once the matching queue entry was confirmed by the remote.
    #[serde(rename = "sincronizado")]
    pub synced: bool,
    pub created_at: String,
}

impl Transaction {
    pub fn validate(&self) -> Result<()> {
        validate_movement(
            self.movement_type,
            self.amount,
            &self.source_box_id,
            self.dest_box_id.as_deref(),
        )
    }
}

/// Transaction before the store assigns id and creation timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub movement_type: MovementType,
    pub category: String,
    pub project_id: Option<String>,
    pub source_box_id: String,
    pub dest_box_id: Option<String>,
    pub third_party_id: Option<String>,
    pub support_ref: Option<String>,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<()> {
        validate_movement(
            self.movement_type,
            self.amount,
            &self.source_box_id,
            self.dest_box_id.as_deref(),
        )
    }

    pub fn into_transaction(self, id: String, created_at: String) -> Transaction {
        Transaction {
            id,
            date: self.date,
            description: self.description,
            amount: self.amount,
            movement_type: self.movement_type,
            category: self.category,
            project_id: self.project_id,
            source_box_id: self.source_box_id,
            dest_box_id: self.dest_box_id,
            third_party_id: self.third_party_id,
            support_ref: self.support_ref,
            synced: false,
            created_at,
        }
    }
}

fn validate_movement(
    movement_type: MovementType,
    amount: Decimal,
    source_box_id: &str,
    dest_box_id: Option<&str>,
) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::InvalidAmount.into());
    }
    if source_box_id.is_empty() {
        return Err(ValidationError::MissingRelation("caja_origen_id").into());
    }
    if movement_type == MovementType::Transfer {
        match dest_box_id {
            None => return Err(ValidationError::MissingDestinationBox.into()),
            Some(dest) if dest == source_box_id => {
                return Err(ValidationError::SameBoxTransfer.into())
            }
            Some(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use rust_decimal_macros::dec;

    fn transfer(amount: Decimal, dest: Option<&str>) -> NewTransaction {
        NewTransaction {
            date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            description: "traslado".to_string(),
            amount,
            movement_type: MovementType::Transfer,
            category: "traslados".to_string(),
            project_id: None,
            source_box_id: "caja-1".to_string(),
            dest_box_id: dest.map(str::to_string),
            third_party_id: None,
            support_ref: None,
        }
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        let result = transfer(dec!(0), Some("caja-2")).validate();
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::InvalidAmount))
        ));
    }

    #[test]
    fn transfer_requires_a_destination() {
        let result = transfer(dec!(100), None).validate();
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::MissingDestinationBox))
        ));
    }

    #[test]
    fn transfer_rejects_same_source_and_destination() {
        let result = transfer(dec!(100), Some("caja-1")).validate();
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::SameBoxTransfer))
        ));
    }

    #[test]
    fn serialized_snapshot_uses_schema_field_names() {
        let tx = transfer(dec!(100), Some("caja-2"))
            .into_transaction("tx-1".to_string(), "2026-03-10T09:00:00Z".to_string());
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["tipo_movimiento"], "transferencia");
        assert_eq!(value["caja_origen_id"], "caja-1");
        assert_eq!(value["caja_destino_id"], "caja-2");
        assert_eq!(value["sincronizado"], false);
        assert_eq!(value["fecha"], "2026-03-10");
    }
}

//! Debt record models shared by both ledger variants.
//!
//! Serde field names follow the shared local/remote schema, so a serialized
//! debt is directly usable as a sync queue payload snapshot.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::transactions::{MovementType, NewTransaction};
use crate::Result;

/// Amortization state, a pure function of outstanding vs original amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtState {
    Pendiente,
    Parcial,
    Pagada,
}

impl DebtState {
    /// Derives the state from the amounts; never stored independently.
    pub fn for_amounts(outstanding: Decimal, original: Decimal) -> DebtState {
        if outstanding.is_zero() {
            DebtState::Pagada
        } else if outstanding == original {
            DebtState::Pendiente
        } else {
            DebtState::Parcial
        }
    }
}

/// One recorded payment against a debt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "monto")]
    pub amount: Decimal,
    #[serde(rename = "fecha")]
    pub date: NaiveDate,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    /// Memo only: recorded for third-party payments but never applied as a
    /// balance effect.
    #[serde(rename = "caja_id")]
    pub box_id: Option<String>,
}

/// A loan from one cash box to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterBoxDebt {
    pub id: String,
    #[serde(rename = "caja_deudora_id")]
    pub debtor_box_id: String,
    #[serde(rename = "caja_acreedora_id")]
    pub creditor_box_id: String,
    #[serde(rename = "monto_original")]
    pub original_amount: Decimal,
    #[serde(rename = "monto_pendiente")]
    pub outstanding_amount: Decimal,
    #[serde(rename = "fecha_prestamo")]
    pub loan_date: NaiveDate,
    #[serde(rename = "estado")]
    pub state: DebtState,
    #[serde(rename = "pagos")]
    pub payments: Vec<Payment>,
    /// Local-only note; the outbound projection drops it.
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    pub created_at: String,
}

impl InterBoxDebt {
    /// The real cash movement behind a loan payment: a transfer of the paid
    /// amount from the debtor box to the creditor box.
    pub fn transfer_for_payment(&self, payment: &Payment) -> NewTransaction {
        NewTransaction {
            date: payment.date,
            description: payment
                .description
                .clone()
                .unwrap_or_else(|| format!("Pago de préstamo entre cajas ({})", self.id)),
            amount: payment.amount,
            movement_type: MovementType::Transfer,
            category: "pago_prestamo".to_string(),
            project_id: None,
            source_box_id: self.debtor_box_id.clone(),
            dest_box_id: Some(self.creditor_box_id.clone()),
            third_party_id: None,
            support_ref: None,
        }
    }
}

/// A payable owed to a supplier, employee or contractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThirdPartyDebt {
    pub id: String,
    #[serde(rename = "tercero_id")]
    pub third_party_id: String,
    #[serde(rename = "empresa_id")]
    pub company_id: Option<String>,
    #[serde(rename = "proyecto_id")]
    pub project_id: Option<String>,
    #[serde(rename = "monto_original")]
    pub original_amount: Decimal,
    #[serde(rename = "monto_pendiente")]
    pub outstanding_amount: Decimal,
    #[serde(rename = "fecha_deuda")]
    pub debt_date: NaiveDate,
    #[serde(rename = "estado")]
    pub state: DebtState,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "pagos")]
    pub payments: Vec<Payment>,
    pub created_at: String,
}

/// Inter-box loan before the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInterBoxDebt {
    pub debtor_box_id: String,
    pub creditor_box_id: String,
    pub original_amount: Decimal,
    pub loan_date: NaiveDate,
    pub description: Option<String>,
}

impl NewInterBoxDebt {
    pub fn validate(&self) -> Result<()> {
        if self.original_amount <= Decimal::ZERO {
            return Err(ValidationError::InvalidAmount.into());
        }
        if self.debtor_box_id == self.creditor_box_id {
            return Err(ValidationError::SelfLoan.into());
        }
        Ok(())
    }
}

/// Third-party payable before the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewThirdPartyDebt {
    pub third_party_id: String,
    pub company_id: Option<String>,
    pub project_id: Option<String>,
    pub original_amount: Decimal,
    pub debt_date: NaiveDate,
    pub description: String,
}

impl NewThirdPartyDebt {
    pub fn validate(&self) -> Result<()> {
        if self.original_amount <= Decimal::ZERO {
            return Err(ValidationError::InvalidAmount.into());
        }
        if self.third_party_id.is_empty() {
            return Err(ValidationError::MissingRelation("tercero_id").into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn state_is_a_pure_function_of_the_amounts() {
        assert_eq!(
            DebtState::for_amounts(dec!(50000), dec!(50000)),
            DebtState::Pendiente
        );
        assert_eq!(
            DebtState::for_amounts(dec!(30000), dec!(50000)),
            DebtState::Parcial
        );
        assert_eq!(DebtState::for_amounts(dec!(0), dec!(50000)), DebtState::Pagada);
    }

    #[test]
    fn state_serializes_to_schema_values() {
        assert_eq!(
            serde_json::to_string(&DebtState::Pendiente).unwrap(),
            "\"pendiente\""
        );
        assert_eq!(
            serde_json::to_string(&DebtState::Parcial).unwrap(),
            "\"parcial\""
        );
        assert_eq!(
            serde_json::to_string(&DebtState::Pagada).unwrap(),
            "\"pagada\""
        );
    }

    #[test]
    fn loan_between_the_same_box_is_rejected() {
        let new_debt = NewInterBoxDebt {
            debtor_box_id: "caja-1".to_string(),
            creditor_box_id: "caja-1".to_string(),
            original_amount: dec!(1000),
            loan_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            description: None,
        };
        assert!(new_debt.validate().is_err());
    }

    #[test]
    fn payment_transfer_moves_debtor_to_creditor() {
        let debt = InterBoxDebt {
            id: "deuda-1".to_string(),
            debtor_box_id: "caja-1".to_string(),
            creditor_box_id: "caja-2".to_string(),
            original_amount: dec!(50000),
            outstanding_amount: dec!(50000),
            loan_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            state: DebtState::Pendiente,
            payments: Vec::new(),
            description: None,
            created_at: "2026-01-15T08:00:00Z".to_string(),
        };
        let payment = Payment {
            amount: dec!(20000),
            date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            description: None,
            box_id: None,
        };

        let transfer = debt.transfer_for_payment(&payment);
        assert_eq!(transfer.movement_type, MovementType::Transfer);
        assert_eq!(transfer.amount, dec!(20000));
        assert_eq!(transfer.source_box_id, "caja-1");
        assert_eq!(transfer.dest_box_id.as_deref(), Some("caja-2"));
    }
}

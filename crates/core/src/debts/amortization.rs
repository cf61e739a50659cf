//! The amortization state machine.
//!
//! Pure functions: a rejected payment returns the error before anything is
//! touched, so the caller's debt record is observably unchanged. Persisting
//! an accepted payment (and, for inter-box debts, the synthesized transfer)
//! is the storage layer's job and happens in one atomic unit.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::Result;

use super::{DebtState, InterBoxDebt, Payment, ThirdPartyDebt};

/// Caller-supplied payment details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentInput {
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
    /// Memo only; carried into third-party payment records, ignored for
    /// inter-box debts (the boxes live on the debt itself).
    pub box_id: Option<String>,
}

/// Shared settlement rule: validates the amount against the outstanding
/// balance and returns the new outstanding amount plus derived state.
fn settle(outstanding: Decimal, original: Decimal, amount: Decimal) -> Result<(Decimal, DebtState)> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::InvalidAmount.into());
    }
    if amount > outstanding {
        return Err(ValidationError::Overpayment {
            outstanding,
            attempted: amount,
        }
        .into());
    }
    let remaining = outstanding - amount;
    Ok((remaining, DebtState::for_amounts(remaining, original)))
}

/// Applies a payment to an inter-box loan, returning the updated record and
/// the appended payment.
pub fn apply_payment_inter_box(
    debt: &InterBoxDebt,
    input: &PaymentInput,
) -> Result<(InterBoxDebt, Payment)> {
    let (remaining, state) = settle(debt.outstanding_amount, debt.original_amount, input.amount)?;
    let payment = Payment {
        amount: input.amount,
        date: input.date,
        description: input.description.clone(),
        box_id: None,
    };
    let mut updated = debt.clone();
    updated.outstanding_amount = remaining;
    updated.state = state;
    updated.payments.push(payment.clone());
    Ok((updated, payment))
}

/// Applies a payment to a third-party payable. Ledger-only: the optional box
/// reference is stored as a memo and triggers no balance effect.
pub fn apply_payment_third_party(
    debt: &ThirdPartyDebt,
    input: &PaymentInput,
) -> Result<(ThirdPartyDebt, Payment)> {
    let (remaining, state) = settle(debt.outstanding_amount, debt.original_amount, input.amount)?;
    let payment = Payment {
        amount: input.amount,
        date: input.date,
        description: input.description.clone(),
        box_id: input.box_id.clone(),
    };
    let mut updated = debt.clone();
    updated.outstanding_amount = remaining;
    updated.state = state;
    updated.payments.push(payment.clone());
    Ok((updated, payment))
}

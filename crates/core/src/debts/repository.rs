use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::transactions::Transaction;
use crate::Result;

use super::{InterBoxDebt, NewInterBoxDebt, NewThirdPartyDebt, PaymentInput, ThirdPartyDebt};

/// Outcome of an inter-box payment: the updated debt plus the synthesized
/// transfer that moved the cash. Both commit in the same unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterBoxPaymentReceipt {
    pub debt: InterBoxDebt,
    pub transfer: Transaction,
}

#[async_trait]
pub trait InterBoxDebtRepositoryTrait: Send + Sync {
    fn get(&self, debt_id: &str) -> Result<InterBoxDebt>;

    fn list(&self) -> Result<Vec<InterBoxDebt>>;

    async fn insert(&self, new_debt: NewInterBoxDebt) -> Result<InterBoxDebt>;

    /// Applies the payment, persists the debt, inserts the synthesized
    /// transfer and applies its balance effects, all atomically. A rejected
    /// payment leaves the debt byte-for-byte unchanged.
    async fn record_payment(
        &self,
        debt_id: &str,
        input: PaymentInput,
    ) -> Result<InterBoxPaymentReceipt>;

    /// Removes the debt unconditionally. Transactions synthesized by past
    /// payments are kept as-is.
    async fn delete(&self, debt_id: &str) -> Result<()>;
}

#[async_trait]
pub trait ThirdPartyDebtRepositoryTrait: Send + Sync {
    fn get(&self, debt_id: &str) -> Result<ThirdPartyDebt>;

    fn list(&self) -> Result<Vec<ThirdPartyDebt>>;

    async fn insert(&self, new_debt: NewThirdPartyDebt) -> Result<ThirdPartyDebt>;

    /// Ledger-only payment: no balance effect even when the input references
    /// a box.
    async fn record_payment(&self, debt_id: &str, input: PaymentInput) -> Result<ThirdPartyDebt>;

    async fn delete(&self, debt_id: &str) -> Result<()>;
}

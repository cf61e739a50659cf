//! Debt workflows for both ledger variants.

use std::sync::Arc;

use log::debug;

use crate::sync::SyncTrigger;
use crate::Result;

use super::{
    InterBoxDebt, InterBoxDebtRepositoryTrait, InterBoxPaymentReceipt, NewInterBoxDebt,
    NewThirdPartyDebt, PaymentInput, ThirdPartyDebt, ThirdPartyDebtRepositoryTrait,
};

#[derive(Clone)]
pub struct DebtService {
    inter_box: Arc<dyn InterBoxDebtRepositoryTrait>,
    third_party: Arc<dyn ThirdPartyDebtRepositoryTrait>,
    sync: Arc<dyn SyncTrigger>,
}

impl DebtService {
    pub fn new(
        inter_box: Arc<dyn InterBoxDebtRepositoryTrait>,
        third_party: Arc<dyn ThirdPartyDebtRepositoryTrait>,
        sync: Arc<dyn SyncTrigger>,
    ) -> Self {
        Self {
            inter_box,
            third_party,
            sync,
        }
    }

    pub fn get_inter_box(&self, debt_id: &str) -> Result<InterBoxDebt> {
        self.inter_box.get(debt_id)
    }

    pub fn list_inter_box(&self) -> Result<Vec<InterBoxDebt>> {
        self.inter_box.list()
    }

    pub async fn create_inter_box(&self, new_debt: NewInterBoxDebt) -> Result<InterBoxDebt> {
        new_debt.validate()?;
        let debt = self.inter_box.insert(new_debt).await?;
        self.sync.trigger();
        Ok(debt)
    }

    /// Records a loan payment: amortizes the debt and moves the cash between
    /// the two boxes through a synthesized transfer.
    pub async fn record_inter_box_payment(
        &self,
        debt_id: &str,
        input: PaymentInput,
    ) -> Result<InterBoxPaymentReceipt> {
        let receipt = self.inter_box.record_payment(debt_id, input).await?;
        debug!(
            "Loan payment on {} settled via transfer {}",
            receipt.debt.id, receipt.transfer.id
        );
        self.sync.trigger();
        Ok(receipt)
    }

    pub async fn delete_inter_box(&self, debt_id: &str) -> Result<()> {
        self.inter_box.delete(debt_id).await?;
        self.sync.trigger();
        Ok(())
    }

    pub fn get_third_party(&self, debt_id: &str) -> Result<ThirdPartyDebt> {
        self.third_party.get(debt_id)
    }

    pub fn list_third_party(&self) -> Result<Vec<ThirdPartyDebt>> {
        self.third_party.list()
    }

    pub async fn create_third_party(&self, new_debt: NewThirdPartyDebt) -> Result<ThirdPartyDebt> {
        new_debt.validate()?;
        let debt = self.third_party.insert(new_debt).await?;
        self.sync.trigger();
        Ok(debt)
    }

    pub async fn record_third_party_payment(
        &self,
        debt_id: &str,
        input: PaymentInput,
    ) -> Result<ThirdPartyDebt> {
        let debt = self.third_party.record_payment(debt_id, input).await?;
        self.sync.trigger();
        Ok(debt)
    }

    pub async fn delete_third_party(&self, debt_id: &str) -> Result<()> {
        self.third_party.delete(debt_id).await?;
        self.sync.trigger();
        Ok(())
    }
}

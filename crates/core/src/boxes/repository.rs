use async_trait::async_trait;

use crate::Result;

use super::{CashBox, NewCashBox};

#[async_trait]
pub trait CashBoxRepositoryTrait: Send + Sync {
    fn get(&self, box_id: &str) -> Result<CashBox>;

    fn list(&self) -> Result<Vec<CashBox>>;

    async fn insert(&self, new_box: NewCashBox) -> Result<CashBox>;
}

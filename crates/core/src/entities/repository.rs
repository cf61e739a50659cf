use async_trait::async_trait;

use crate::Result;

use super::{Category, Company, Project, ThirdParty};

/// Store access for the reference entities. Creation is deliberately thin;
/// the entity-management workflows own anything richer.
#[async_trait]
pub trait ReferenceDataRepositoryTrait: Send + Sync {
    async fn insert_company(&self, name: String) -> Result<Company>;
    fn list_companies(&self) -> Result<Vec<Company>>;

    async fn insert_project(&self, name: String, company_id: Option<String>) -> Result<Project>;
    fn list_projects(&self) -> Result<Vec<Project>>;

    async fn insert_third_party(&self, name: String, kind: String) -> Result<ThirdParty>;
    fn list_third_parties(&self) -> Result<Vec<ThirdParty>>;

    async fn insert_category(&self, name: String, kind: String) -> Result<Category>;
    fn list_categories(&self) -> Result<Vec<Category>>;
}

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use cajaflow_core::entities::{
    Category, Company, Project, ReferenceDataRepositoryTrait, ThirdParty,
};
use cajaflow_core::sync::{SyncOperation, SyncTable};
use cajaflow_core::Result;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{categorias, empresas, proyectos, terceros};
use crate::sync::enqueue_mutation;

use super::{CategoryDB, CompanyDB, ProjectDB, ThirdPartyDB};

pub struct ReferenceDataRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ReferenceDataRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl ReferenceDataRepositoryTrait for ReferenceDataRepository {
    async fn insert_company(&self, name: String) -> Result<Company> {
        self.writer
            .exec(move |conn| {
                let row = CompanyDB {
                    id: Uuid::new_v4().to_string(),
                    nombre: name,
                    created_at: Utc::now().to_rfc3339(),
                };
                diesel::insert_into(empresas::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                let company = Company::from(row);
                enqueue_mutation(
                    conn,
                    SyncTable::Companies,
                    SyncOperation::Insert,
                    &serde_json::to_value(&company)?,
                )?;
                Ok(company)
            })
            .await
    }

    fn list_companies(&self) -> Result<Vec<Company>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = empresas::table
            .order(empresas::nombre.asc())
            .load::<CompanyDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Company::from).collect())
    }

    async fn insert_project(&self, name: String, company_id: Option<String>) -> Result<Project> {
        self.writer
            .exec(move |conn| {
                let row = ProjectDB {
                    id: Uuid::new_v4().to_string(),
                    nombre: name,
                    empresa_id: company_id,
                    created_at: Utc::now().to_rfc3339(),
                };
                diesel::insert_into(proyectos::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                let project = Project::from(row);
                enqueue_mutation(
                    conn,
                    SyncTable::Projects,
                    SyncOperation::Insert,
                    &serde_json::to_value(&project)?,
                )?;
                Ok(project)
            })
            .await
    }

    fn list_projects(&self) -> Result<Vec<Project>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = proyectos::table
            .order(proyectos::nombre.asc())
            .load::<ProjectDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn insert_third_party(&self, name: String, kind: String) -> Result<ThirdParty> {
        self.writer
            .exec(move |conn| {
                let row = ThirdPartyDB {
                    id: Uuid::new_v4().to_string(),
                    nombre: name,
                    tipo: kind,
                    created_at: Utc::now().to_rfc3339(),
                };
                diesel::insert_into(terceros::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                let third_party = ThirdParty::from(row);
                enqueue_mutation(
                    conn,
                    SyncTable::ThirdParties,
                    SyncOperation::Insert,
                    &serde_json::to_value(&third_party)?,
                )?;
                Ok(third_party)
            })
            .await
    }

    fn list_third_parties(&self) -> Result<Vec<ThirdParty>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = terceros::table
            .order(terceros::nombre.asc())
            .load::<ThirdPartyDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(ThirdParty::from).collect())
    }

    async fn insert_category(&self, name: String, kind: String) -> Result<Category> {
        self.writer
            .exec(move |conn| {
                let row = CategoryDB {
                    id: Uuid::new_v4().to_string(),
                    nombre: name,
                    tipo: kind,
                    created_at: Utc::now().to_rfc3339(),
                };
                diesel::insert_into(categorias::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                let category = Category::from(row);
                enqueue_mutation(
                    conn,
                    SyncTable::Categories,
                    SyncOperation::Insert,
                    &serde_json::to_value(&category)?,
                )?;
                Ok(category)
            })
            .await
    }

    fn list_categories(&self) -> Result<Vec<Category>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = categorias::table
            .order(categorias::nombre.asc())
            .load::<CategoryDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }
}

use diesel::prelude::*;

use cajaflow_core::entities::{Category, Company, Project, ThirdParty};

#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::empresas)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CompanyDB {
    pub id: String,
    pub nombre: String,
    pub created_at: String,
}

#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::proyectos)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProjectDB {
    pub id: String,
    pub nombre: String,
    pub empresa_id: Option<String>,
    pub created_at: String,
}

#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::terceros)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ThirdPartyDB {
    pub id: String,
    pub nombre: String,
    pub tipo: String,
    pub created_at: String,
}

#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::categorias)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CategoryDB {
    pub id: String,
    pub nombre: String,
    pub tipo: String,
    pub created_at: String,
}

impl From<CompanyDB> for Company {
    fn from(row: CompanyDB) -> Self {
        Company {
            id: row.id,
            name: row.nombre,
            created_at: row.created_at,
        }
    }
}

impl From<ProjectDB> for Project {
    fn from(row: ProjectDB) -> Self {
        Project {
            id: row.id,
            name: row.nombre,
            company_id: row.empresa_id,
            created_at: row.created_at,
        }
    }
}

impl From<ThirdPartyDB> for ThirdParty {
    fn from(row: ThirdPartyDB) -> Self {
        ThirdParty {
            id: row.id,
            name: row.nombre,
            kind: row.tipo,
            created_at: row.created_at,
        }
    }
}

impl From<CategoryDB> for Category {
    fn from(row: CategoryDB) -> Self {
        Category {
            id: row.id,
            name: row.nombre,
            kind: row.tipo,
            created_at: row.created_at,
        }
    }
}

//! Local-replica maintenance: synced-flag flips and full-table replace from
//! the remote source of truth.
//!
//! The replace path builds SQL dynamically from the pulled JSON rows, keeping
//! only columns the local table actually declares (PRAGMA table_info), so a
//! newer remote schema never breaks the pull.

use std::collections::HashSet;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use cajaflow_core::errors::{DatabaseError, Error, Result};
use cajaflow_core::sync::{SyncReplicaTrait, SyncTable};

use crate::db::WriteHandle;
use crate::errors::StorageError;
use crate::schema::transacciones;

fn escape_sqlite_str(value: &str) -> String {
    value.replace('\'', "''")
}

fn quote_identifier(value: &str) -> String {
    format!("`{}`", value.replace('`', "``"))
}

#[derive(diesel::QueryableByName)]
struct PragmaTableInfoRow {
    #[diesel(sql_type = diesel::sql_types::Text)]
    name: String,
}

fn load_table_columns(conn: &mut SqliteConnection, table_name: &str) -> Result<Vec<String>> {
    let pragma_sql = format!("PRAGMA table_info('{}')", escape_sqlite_str(table_name));
    let columns = diesel::sql_query(pragma_sql)
        .load::<PragmaTableInfoRow>(conn)
        .map_err(StorageError::from)?
        .into_iter()
        .map(|row| row.name)
        .collect::<Vec<_>>();
    Ok(columns)
}

fn json_value_to_sql_literal(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::Bool(v) => {
            if *v {
                "1".to_string()
            } else {
                "0".to_string()
            }
        }
        serde_json::Value::Number(v) => v.to_string(),
        serde_json::Value::String(v) => format!("'{}'", escape_sqlite_str(v)),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            format!(
                "'{}'",
                escape_sqlite_str(&serde_json::to_string(value).unwrap_or_default())
            )
        }
    }
}

fn replace_table_rows(
    conn: &mut SqliteConnection,
    table: SyncTable,
    rows: &[serde_json::Value],
) -> Result<()> {
    let table_name = table.table_name();
    let table_ident = quote_identifier(table_name);
    let known_columns = load_table_columns(conn, table_name)?
        .into_iter()
        .collect::<HashSet<_>>();

    diesel::sql_query(format!("DELETE FROM {table_ident}"))
        .execute(conn)
        .map_err(StorageError::from)?;

    for row in rows {
        let Some(object) = row.as_object() else {
            return Err(Error::Database(DatabaseError::Internal(format!(
                "Pulled row for '{table_name}' is not a JSON object"
            ))));
        };
        let fields = object
            .iter()
            .filter(|(column, _)| known_columns.contains(*column))
            .collect::<Vec<_>>();
        if fields.is_empty() {
            return Err(Error::Database(DatabaseError::Internal(format!(
                "Pulled row for '{table_name}' has no known columns"
            ))));
        }

        let columns = fields
            .iter()
            .map(|(column, _)| quote_identifier(column))
            .collect::<Vec<_>>()
            .join(", ");
        let values = fields
            .iter()
            .map(|(_, value)| json_value_to_sql_literal(value))
            .collect::<Vec<_>>()
            .join(", ");
        let insert_sql = format!("INSERT INTO {table_ident} ({columns}) VALUES ({values})");
        diesel::sql_query(insert_sql)
            .execute(conn)
            .map_err(StorageError::from)?;
    }
    Ok(())
}

pub struct SyncReplica {
    writer: WriteHandle,
}

impl SyncReplica {
    pub fn new(writer: WriteHandle) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl SyncReplicaTrait for SyncReplica {
    async fn mark_synced(&self, table: SyncTable, record_id: String) -> Result<()> {
        if !table.carries_synced_flag() {
            return Ok(());
        }
        self.writer
            .exec(move |conn| {
                diesel::update(transacciones::table.find(&record_id))
                    .set(transacciones::sincronizado.eq(true))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn replace_all(
        &self,
        tables: Vec<(SyncTable, Vec<serde_json::Value>)>,
    ) -> Result<()> {
        self.writer
            .exec(move |conn| {
                // One transaction for the whole replace: old child rows may
                // reference parents that are being swapped out, so the
                // constraints only validate once every table is consistent
                // again, at commit time.
                diesel::sql_query("PRAGMA defer_foreign_keys = ON")
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let result = (|| -> Result<()> {
                    for (table, rows) in &tables {
                        replace_table_rows(conn, *table, rows)?;
                    }
                    Ok(())
                })();

                let _ = diesel::sql_query("PRAGMA defer_foreign_keys = OFF").execute(conn);
                result
            })
            .await
    }
}

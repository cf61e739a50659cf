//! Outbound payload projection.
//!
//! Every queued payload is a full serialized snapshot of the local record.
//! Before dispatch, the snapshot is projected onto the target table's remote
//! schema: only allow-listed fields survive, and datetime values are trimmed
//! to date-only where the remote column is date-typed. Local-only fields never
//! reach the remote call.

use serde_json::{Map, Value};

use super::SyncTable;

/// Outbound field allow-list per remote table.
pub fn allowed_fields(table: SyncTable) -> &'static [&'static str] {
    match table {
        SyncTable::Companies => &["id", "nombre", "created_at"],
        SyncTable::Projects => &["id", "nombre", "empresa_id", "created_at"],
        SyncTable::CashBoxes => &[
            "id",
            "nombre",
            "tipo",
            "empresa_id",
            "saldo_actual",
            "banco_nombre",
            "numero_cuenta",
            "created_at",
            "updated_at",
        ],
        SyncTable::ThirdParties => &["id", "nombre", "tipo", "created_at"],
        SyncTable::Transactions => &[
            "id",
            "fecha",
            "descripcion",
            "monto",
            "tipo_movimiento",
            "categoria",
            "proyecto_id",
            "caja_origen_id",
            "caja_destino_id",
            "tercero_id",
            "soporte_url",
            "sincronizado",
            "created_at",
        ],
        SyncTable::InterBoxDebts => &[
            "id",
            "caja_deudora_id",
            "caja_acreedora_id",
            "monto_original",
            "monto_pendiente",
            "fecha_prestamo",
            "estado",
            "pagos",
            "created_at",
        ],
        SyncTable::ThirdPartyDebts => &[
            "id",
            "tercero_id",
            "empresa_id",
            "proyecto_id",
            "monto_original",
            "monto_pendiente",
            "fecha_deuda",
            "estado",
            "descripcion",
            "pagos",
            "created_at",
        ],
        SyncTable::Categories => &["id", "nombre", "tipo", "created_at"],
    }
}

/// Fields whose remote column is date-typed; datetime strings are normalized
/// to `YYYY-MM-DD` before dispatch.
pub fn date_only_fields(table: SyncTable) -> &'static [&'static str] {
    match table {
        SyncTable::Transactions => &["fecha"],
        SyncTable::InterBoxDebts => &["fecha_prestamo"],
        SyncTable::ThirdPartyDebts => &["fecha_deuda"],
        _ => &[],
    }
}

/// Optional relation fields that may be nulled out when the remote reports a
/// missing foreign key. Required relations are never nulled.
pub fn nullable_relation_fields(table: SyncTable) -> &'static [&'static str] {
    match table {
        SyncTable::Projects => &["empresa_id"],
        SyncTable::CashBoxes => &["empresa_id"],
        SyncTable::Transactions => &["proyecto_id", "tercero_id"],
        SyncTable::ThirdPartyDebts => &["empresa_id", "proyecto_id"],
        _ => &[],
    }
}

/// Projects a payload snapshot onto the table's remote schema.
pub fn project_outbound(table: SyncTable, payload: &Value) -> Value {
    let Some(object) = payload.as_object() else {
        return Value::Object(Map::new());
    };

    let dates = date_only_fields(table);
    let mut projected = Map::new();
    for field in allowed_fields(table) {
        let Some(value) = object.get(*field) else {
            continue;
        };
        let value = if dates.contains(field) {
            normalize_date_only(value)
        } else {
            value.clone()
        };
        projected.insert((*field).to_string(), value);
    }
    Value::Object(projected)
}

/// Returns the payload with the table's optional relation fields nulled out,
/// used for the single missing-relation retry.
pub fn null_out_relations(table: SyncTable, payload: &Value) -> Value {
    let mut result = payload.clone();
    if let Some(object) = result.as_object_mut() {
        for field in nullable_relation_fields(table) {
            if object.contains_key(*field) {
                object.insert((*field).to_string(), Value::Null);
            }
        }
    }
    result
}

/// Trims an RFC 3339 datetime string down to its date component. Plain dates
/// and non-string values pass through untouched.
fn normalize_date_only(value: &Value) -> Value {
    match value {
        Value::String(text) => {
            if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(text) {
                return Value::String(datetime.date_naive().format("%Y-%m-%d").to_string());
            }
            if text.len() > 10 && text.as_bytes().get(10) == Some(&b'T') {
                return Value::String(text[..10].to_string());
            }
            value.clone()
        }
        _ => value.clone(),
    }
}

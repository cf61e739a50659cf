//! Shared helpers for storage tests: disposable databases built with the real
//! migrations, plus raw-SQL seeding that bypasses the repositories (and their
//! queue entries).

use std::sync::Arc;

use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::db::{self, DbPool, WriteHandle};

pub(crate) fn setup_db() -> (Arc<DbPool>, WriteHandle) {
    let app_data = tempfile::tempdir()
        .expect("tempdir")
        .keep()
        .to_string_lossy()
        .to_string();
    let db_path = db::init(&app_data).expect("init db");
    db::run_migrations(&db_path).expect("migrate db");
    let pool = db::create_pool(&db_path).expect("create pool");
    let writer = db::spawn_writer(pool.as_ref().clone());
    (pool, writer)
}

pub(crate) fn seed_box(pool: &Arc<DbPool>, box_id: &str, balance: Decimal) {
    let mut conn = db::get_connection(pool).expect("conn");
    let sql = format!(
        "INSERT INTO cajas (id, nombre, tipo, empresa_id, saldo_actual, banco_nombre, numero_cuenta, created_at, updated_at) \
         VALUES ('{box_id}', 'Caja {box_id}', 'efectivo', NULL, '{balance}', NULL, NULL, '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')"
    );
    diesel::sql_query(sql).execute(&mut conn).expect("seed box");
}

pub(crate) fn seed_third_party(pool: &Arc<DbPool>, third_party_id: &str) {
    let mut conn = db::get_connection(pool).expect("conn");
    let sql = format!(
        "INSERT INTO terceros (id, nombre, tipo, created_at) \
         VALUES ('{third_party_id}', 'Tercero {third_party_id}', 'proveedor', '2026-01-01T00:00:00Z')"
    );
    diesel::sql_query(sql)
        .execute(&mut conn)
        .expect("seed third party");
}

pub(crate) fn queue_depth(pool: &Arc<DbPool>) -> i64 {
    use crate::schema::sync_queue;
    let mut conn = db::get_connection(pool).expect("conn");
    sync_queue::table
        .select(diesel::dsl::count_star())
        .first(&mut conn)
        .expect("queue depth")
}

//! Queue persistence tests plus end-to-end engine passes over a real store.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use diesel::prelude::*;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use cajaflow_core::sync::{
    NewSyncQueueEntry, RemoteDataStore, RemoteError, RemoteErrorKind, SyncEngine, SyncOperation,
    SyncQueueRepositoryTrait, SyncReplicaTrait, SyncTable,
};
use cajaflow_core::transactions::{MovementType, NewTransaction, TransactionRepositoryTrait};

use crate::db::get_connection;
use crate::schema::{sync_queue, transacciones};
use crate::test_support::{queue_depth, seed_box, setup_db};
use crate::transactions::TransactionRepository;

use super::{SyncQueueRepository, SyncReplica};

/// Remote that plays back scripted outcomes and records every dispatch.
#[derive(Default)]
struct ScriptedRemote {
    script: StdMutex<VecDeque<Result<(), RemoteError>>>,
    calls: StdMutex<Vec<(SyncOperation, SyncTable, Value)>>,
    tables: StdMutex<Vec<(SyncTable, Vec<Value>)>>,
}

impl ScriptedRemote {
    fn with_script(outcomes: Vec<Result<(), RemoteError>>) -> Self {
        Self {
            script: StdMutex::new(outcomes.into()),
            ..Self::default()
        }
    }

    fn serve_table(&self, table: SyncTable, rows: Vec<Value>) {
        self.tables.lock().unwrap().push((table, rows));
    }

    fn next_outcome(&self) -> Result<(), RemoteError> {
        self.script.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

#[async_trait]
impl RemoteDataStore for ScriptedRemote {
    async fn insert(&self, table: SyncTable, row: Value) -> Result<(), RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push((SyncOperation::Insert, table, row));
        self.next_outcome()
    }

    async fn update(&self, table: SyncTable, _record_id: &str, row: Value) -> Result<(), RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push((SyncOperation::Update, table, row));
        self.next_outcome()
    }

    async fn delete(&self, table: SyncTable, record_id: &str) -> Result<(), RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push((SyncOperation::Delete, table, json!({ "id": record_id })));
        self.next_outcome()
    }

    async fn fetch_table(&self, table: SyncTable) -> Result<Vec<Value>, RemoteError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .iter()
            .find(|(t, _)| *t == table)
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default())
    }
}

fn expense(amount: rust_decimal::Decimal) -> NewTransaction {
    NewTransaction {
        date: chrono::NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
        description: "compra de insumos".to_string(),
        amount,
        movement_type: MovementType::Expense,
        category: "insumos".to_string(),
        project_id: None,
        source_box_id: "caja-a".to_string(),
        dest_box_id: None,
        third_party_id: None,
        support_ref: None,
    }
}

#[tokio::test]
async fn migrations_create_every_local_table() {
    let (pool, _writer) = setup_db();
    let mut conn = get_connection(&pool).expect("conn");
    for table in [
        "empresas",
        "proyectos",
        "cajas",
        "terceros",
        "transacciones",
        "sync_queue",
        "deudas_cajas",
        "deudas_terceros",
        "categorias",
    ] {
        #[derive(diesel::QueryableByName)]
        struct CountRow {
            #[diesel(sql_type = diesel::sql_types::BigInt)]
            c: i64,
        }
        let sql = format!(
            "SELECT COUNT(*) as c FROM sqlite_master WHERE type='table' AND name='{table}'"
        );
        let row = diesel::sql_query(sql)
            .get_result::<CountRow>(&mut conn)
            .expect("table exists");
        assert_eq!(row.c, 1, "missing table {table}");
    }
}

#[tokio::test]
async fn queue_is_fifo_and_records_failures() {
    let (pool, writer) = setup_db();
    let queue = SyncQueueRepository::new(pool.clone(), writer);

    for name in ["primero", "segundo", "tercero"] {
        queue
            .enqueue(NewSyncQueueEntry {
                table: SyncTable::Companies,
                operation: SyncOperation::Insert,
                payload: json!({ "id": name }),
            })
            .await
            .unwrap();
    }

    let entries = queue.list_oldest_first().unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries.windows(2).all(|w| w[0].id < w[1].id));

    queue
        .record_failure(entries[0].id, "timeout".to_string())
        .await
        .unwrap();
    let entries = queue.list_oldest_first().unwrap();
    assert_eq!(entries[0].attempts, 1);
    assert_eq!(entries[0].last_error.as_deref(), Some("timeout"));

    queue.delete(entries[0].id).await.unwrap();
    assert_eq!(queue.pending_count().unwrap(), 2);
}

#[tokio::test]
async fn expense_create_then_successful_pass_marks_synced() {
    let (pool, writer) = setup_db();
    seed_box(&pool, "caja-a", dec!(100000));
    let transactions = TransactionRepository::new(pool.clone(), writer.clone());

    let tx = transactions.insert(expense(dec!(30000))).await.unwrap();
    assert!(!tx.synced);
    assert_eq!(queue_depth(&pool), 1);

    let remote = Arc::new(ScriptedRemote::default());
    let engine = SyncEngine::new(
        Arc::new(SyncQueueRepository::new(pool.clone(), writer.clone())),
        Arc::new(SyncReplica::new(writer)),
        remote.clone(),
    );

    let summary = engine.process_queue().await.unwrap();
    assert!(summary.success);
    assert_eq!(summary.synced_count, 1);
    assert_eq!(queue_depth(&pool), 0);

    let stored = transactions.get(&tx.id).unwrap();
    assert!(stored.synced);

    // The dispatched row was projected onto the remote schema.
    let calls = remote.calls.lock().unwrap();
    let row = calls[0].2.as_object().unwrap();
    assert!(row.contains_key("monto"));
    assert!(row.contains_key("caja_origen_id"));
    assert_eq!(calls[0].1, SyncTable::Transactions);
}

#[tokio::test]
async fn duplicate_key_on_insert_cleans_up_like_success() {
    let (pool, writer) = setup_db();
    seed_box(&pool, "caja-a", dec!(100000));
    let transactions = TransactionRepository::new(pool.clone(), writer.clone());
    let tx = transactions.insert(expense(dec!(30000))).await.unwrap();

    let remote = Arc::new(ScriptedRemote::with_script(vec![Err(RemoteError::new(
        RemoteErrorKind::Duplicate,
        "duplicate key value violates unique constraint",
    ))]));
    let engine = SyncEngine::new(
        Arc::new(SyncQueueRepository::new(pool.clone(), writer.clone())),
        Arc::new(SyncReplica::new(writer)),
        remote,
    );

    let summary = engine.process_queue().await.unwrap();
    assert!(summary.success, "duplicate must not surface as an error");
    assert!(summary.errors.is_empty());
    assert_eq!(queue_depth(&pool), 0);
    assert!(transactions.get(&tx.id).unwrap().synced);
}

#[tokio::test]
async fn transient_failure_keeps_the_entry_for_the_next_trigger() {
    let (pool, writer) = setup_db();
    seed_box(&pool, "caja-a", dec!(100000));
    let transactions = TransactionRepository::new(pool.clone(), writer.clone());
    let tx = transactions.insert(expense(dec!(30000))).await.unwrap();

    let remote = Arc::new(ScriptedRemote::with_script(vec![Err(RemoteError::new(
        RemoteErrorKind::Transient,
        "network unreachable",
    ))]));
    let engine = SyncEngine::new(
        Arc::new(SyncQueueRepository::new(pool.clone(), writer.clone())),
        Arc::new(SyncReplica::new(writer.clone())),
        remote,
    );

    let summary = engine.process_queue().await.unwrap();
    assert!(!summary.success);
    assert_eq!(queue_depth(&pool), 1);
    assert!(!transactions.get(&tx.id).unwrap().synced);

    {
        let mut conn = get_connection(&pool).expect("conn");
        let (attempts, last_error): (i32, Option<String>) = sync_queue::table
            .select((sync_queue::intentos, sync_queue::last_error))
            .first(&mut conn)
            .expect("entry");
        assert_eq!(attempts, 1);
        assert_eq!(last_error.as_deref(), Some("network unreachable"));
    }

    // A later pass with connectivity restored drains the same entry; the
    // second pass after that syncs nothing.
    let remote = Arc::new(ScriptedRemote::default());
    let engine = SyncEngine::new(
        Arc::new(SyncQueueRepository::new(pool.clone(), writer.clone())),
        Arc::new(SyncReplica::new(writer)),
        remote,
    );
    let retry = engine.process_queue().await.unwrap();
    assert_eq!(retry.synced_count, 1);
    let idle = engine.process_queue().await.unwrap();
    assert_eq!(idle.synced_count, 0);
    assert!(idle.success);
}

#[tokio::test]
async fn replace_table_is_a_full_replace() {
    let (pool, writer) = setup_db();
    seed_box(&pool, "caja-vieja", dec!(500));
    let replica = SyncReplica::new(writer);

    replica
        .replace_all(vec![(
            SyncTable::CashBoxes,
            vec![json!({
                "id": "caja-remota",
                "nombre": "Caja Principal",
                "tipo": "banco",
                "empresa_id": null,
                "saldo_actual": "125000",
                "banco_nombre": "Banco Azul",
                "numero_cuenta": "001-223",
                "created_at": "2026-01-01T00:00:00Z",
                "updated_at": "2026-01-01T00:00:00Z",
                "columna_desconocida": "ignorada"
            })],
        )])
        .await
        .unwrap();

    use crate::schema::cajas;
    let mut conn = get_connection(&pool).expect("conn");
    let ids = cajas::table
        .select(cajas::id)
        .load::<String>(&mut conn)
        .expect("ids");
    assert_eq!(ids, vec!["caja-remota".to_string()]);
}

#[tokio::test]
async fn refresh_from_remote_seeds_the_local_store() {
    let (pool, writer) = setup_db();
    seed_box(&pool, "caja-local", dec!(1));
    let remote = Arc::new(ScriptedRemote::default());
    remote.serve_table(
        SyncTable::CashBoxes,
        vec![json!({
            "id": "caja-remota",
            "nombre": "Caja Principal",
            "tipo": "efectivo",
            "saldo_actual": "9000",
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        })],
    );
    remote.serve_table(
        SyncTable::Transactions,
        vec![json!({
            "id": "tx-remota",
            "fecha": "2026-02-02",
            "descripcion": "venta",
            "monto": "9000",
            "tipo_movimiento": "ingreso",
            "categoria": "ventas",
            "caja_origen_id": "caja-remota",
            "sincronizado": true,
            "created_at": "2026-02-02T10:00:00Z"
        })],
    );

    let engine = SyncEngine::new(
        Arc::new(SyncQueueRepository::new(pool.clone(), writer.clone())),
        Arc::new(SyncReplica::new(writer)),
        remote,
    );
    let report = engine.refresh_from_remote().await.unwrap();
    assert_eq!(report.tables, SyncTable::ALL.len());
    assert_eq!(report.rows, 2);

    let mut conn = get_connection(&pool).expect("conn");
    let tx_ids = transacciones::table
        .select(transacciones::id)
        .load::<String>(&mut conn)
        .expect("tx ids");
    assert_eq!(tx_ids, vec!["tx-remota".to_string()]);
}

//! Background sync worker.
//!
//! Owns the fire-and-forget side of syncing: local mutations call
//! [`SyncTrigger::trigger`], repeated signals coalesce through a `Notify`
//! permit into a single follow-up pass, and the engine's pass lock guarantees
//! one drain at a time. Callers that want the outcome await [`run_once`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, error, info};
use tokio::sync::Notify;

use crate::errors::Result;

use super::{ConnectivityProbe, SyncEngine, SyncSummary};

/// Fire-and-forget request for a queue drain.
pub trait SyncTrigger: Send + Sync {
    fn trigger(&self);
}

/// Trigger that drops requests; used where no sync backend is wired.
pub struct NoopSyncTrigger;

impl SyncTrigger for NoopSyncTrigger {
    fn trigger(&self) {}
}

pub struct SyncWorker {
    engine: Arc<SyncEngine>,
    connectivity: Arc<dyn ConnectivityProbe>,
    notify: Notify,
    stopped: AtomicBool,
}

impl SyncWorker {
    /// Creates the worker and spawns its drain loop on the current runtime.
    pub fn spawn(engine: Arc<SyncEngine>, connectivity: Arc<dyn ConnectivityProbe>) -> Arc<Self> {
        let worker = Arc::new(Self {
            engine,
            connectivity,
            notify: Notify::new(),
            stopped: AtomicBool::new(false),
        });
        tokio::spawn(run_loop(Arc::clone(&worker)));
        worker
    }

    /// Drains the queue now if the connectivity oracle reports online,
    /// returning the pass summary. Offline requests are a no-op.
    pub async fn run_once(&self) -> Result<SyncSummary> {
        if !self.connectivity.is_online().await {
            debug!("Sync requested while offline; leaving queue untouched");
            return Ok(SyncSummary::empty());
        }
        self.engine.process_queue().await
    }

    /// Stops the drain loop. Pending triggers are discarded.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    pub fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }
}

impl SyncTrigger for SyncWorker {
    fn trigger(&self) {
        // notify_one stores a single permit, so any number of triggers during
        // an in-flight pass collapse into exactly one follow-up pass.
        self.notify.notify_one();
    }
}

async fn run_loop(worker: Arc<SyncWorker>) {
    loop {
        worker.notify.notified().await;
        if worker.stopped.load(Ordering::SeqCst) {
            info!("Sync worker stopped");
            break;
        }
        if !worker.connectivity.is_online().await {
            debug!("Sync trigger ignored: offline");
            continue;
        }
        match worker.engine.process_queue().await {
            Ok(summary) if summary.success => {
                debug!("Background sync pass synced {}", summary.synced_count)
            }
            Ok(summary) => debug!(
                "Background sync pass deferred {} entries",
                summary.errors.len()
            ),
            Err(err) => error!("Background sync pass failed: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    use crate::sync::{
        NewSyncQueueEntry, RemoteDataStore, RemoteError, SyncQueueEntry,
        SyncQueueRepositoryTrait, SyncReplicaTrait, SyncTable,
    };

    #[derive(Default)]
    struct EmptyQueue;

    #[async_trait]
    impl SyncQueueRepositoryTrait for EmptyQueue {
        async fn enqueue(&self, _entry: NewSyncQueueEntry) -> Result<SyncQueueEntry> {
            unreachable!("not used")
        }

        fn list_oldest_first(&self) -> Result<Vec<SyncQueueEntry>> {
            Ok(Vec::new())
        }

        async fn delete(&self, _entry_id: i64) -> Result<()> {
            Ok(())
        }

        async fn record_failure(&self, _entry_id: i64, _message: String) -> Result<()> {
            Ok(())
        }

        fn pending_count(&self) -> Result<i64> {
            Ok(0)
        }
    }

    struct NullReplica;

    #[async_trait]
    impl SyncReplicaTrait for NullReplica {
        async fn mark_synced(&self, _table: SyncTable, _record_id: String) -> Result<()> {
            Ok(())
        }

        async fn replace_all(
            &self,
            _tables: Vec<(SyncTable, Vec<serde_json::Value>)>,
        ) -> Result<()> {
            Ok(())
        }
    }

    struct NullRemote;

    #[async_trait]
    impl RemoteDataStore for NullRemote {
        async fn insert(
            &self,
            _table: SyncTable,
            _row: serde_json::Value,
        ) -> std::result::Result<(), RemoteError> {
            Ok(())
        }

        async fn update(
            &self,
            _table: SyncTable,
            _record_id: &str,
            _row: serde_json::Value,
        ) -> std::result::Result<(), RemoteError> {
            Ok(())
        }

        async fn delete(
            &self,
            _table: SyncTable,
            _record_id: &str,
        ) -> std::result::Result<(), RemoteError> {
            Ok(())
        }

        async fn fetch_table(
            &self,
            _table: SyncTable,
        ) -> std::result::Result<Vec<serde_json::Value>, RemoteError> {
            Ok(Vec::new())
        }
    }

    struct FlaggedProbe(StdMutex<bool>);

    #[async_trait]
    impl crate::sync::ConnectivityProbe for FlaggedProbe {
        async fn is_online(&self) -> bool {
            *self.0.lock().unwrap()
        }
    }

    fn test_engine() -> Arc<SyncEngine> {
        Arc::new(SyncEngine::new(
            Arc::new(EmptyQueue),
            Arc::new(NullReplica),
            Arc::new(NullRemote),
        ))
    }

    #[tokio::test]
    async fn run_once_while_offline_is_a_no_op() {
        let worker = SyncWorker::spawn(test_engine(), Arc::new(FlaggedProbe(StdMutex::new(false))));
        let summary = worker.run_once().await.unwrap();
        assert!(summary.success);
        assert_eq!(summary.synced_count, 0);
        worker.stop();
    }

    #[tokio::test]
    async fn run_once_while_online_runs_a_pass() {
        let worker = SyncWorker::spawn(test_engine(), Arc::new(FlaggedProbe(StdMutex::new(true))));
        let summary = worker.run_once().await.unwrap();
        assert!(summary.success);
        worker.stop();
    }

    #[tokio::test]
    async fn triggers_do_not_block_the_caller() {
        let worker = SyncWorker::spawn(test_engine(), Arc::new(FlaggedProbe(StdMutex::new(true))));
        for _ in 0..100 {
            worker.trigger();
        }
        worker.stop();
    }
}

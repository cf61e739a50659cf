//! Single-writer actor.
//!
//! One dedicated thread owns all writes. Each job runs inside one immediate
//! transaction, so a balance or debt mutation is an atomic read-modify-write
//! scoped to the records it touches, and a row mutation commits together
//! with its sync queue entry or not at all.

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::error;
use tokio::sync::{mpsc, oneshot};

use cajaflow_core::errors::{DatabaseError, Error, Result};

use crate::errors::StorageError;

type WriteJob = Box<dyn FnOnce(&mut SqliteConnection) + Send>;

/// Handle to the writer thread; cheap to clone, shared by every repository.
#[derive(Clone)]
pub struct WriteHandle {
    sender: mpsc::UnboundedSender<WriteJob>,
}

/// Spawns the writer thread. Jobs drain strictly in submission order.
pub fn spawn_writer(pool: Pool<ConnectionManager<SqliteConnection>>) -> WriteHandle {
    let (sender, mut receiver) = mpsc::unbounded_channel::<WriteJob>();
    std::thread::Builder::new()
        .name("cajaflow-writer".to_string())
        .spawn(move || {
            while let Some(job) = receiver.blocking_recv() {
                match pool.get() {
                    Ok(mut conn) => job(&mut conn),
                    // The reply sender inside the job is dropped with it; the
                    // caller observes WriterUnavailable.
                    Err(err) => error!("Writer could not acquire a connection: {err}"),
                }
            }
        })
        .expect("Failed to spawn writer thread");
    WriteHandle { sender }
}

enum TxError {
    Domain(Error),
    Diesel(diesel::result::Error),
}

impl From<diesel::result::Error> for TxError {
    fn from(err: diesel::result::Error) -> Self {
        TxError::Diesel(err)
    }
}

impl WriteHandle {
    /// Runs the closure on the writer thread inside one immediate
    /// transaction. Any error rolls the whole unit back.
    pub async fn exec<T, F>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply, response) = oneshot::channel();
        let boxed: WriteJob = Box::new(move |conn| {
            let outcome = conn
                .immediate_transaction::<T, TxError, _>(|tx| job(tx).map_err(TxError::Domain))
                .map_err(|err| match err {
                    TxError::Domain(domain) => domain,
                    TxError::Diesel(db) => StorageError::from(db).into(),
                });
            let _ = reply.send(outcome);
        });
        self.sender
            .send(boxed)
            .map_err(|_| Error::Database(DatabaseError::WriterUnavailable))?;
        response
            .await
            .map_err(|_| Error::Database(DatabaseError::WriterUnavailable))?
    }
}

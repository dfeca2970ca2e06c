//! Background store worker.
//!
//! # Responsibility
//! - Own the process-wide SQLite connection on a dedicated thread.
//! - Accept entry requests without blocking the caller and hand back one
//!   completion handle (`Pending<T>`) per request.
//!
//! # Invariants
//! - Requests execute strictly in submission order (single FIFO queue), so
//!   a `save` followed by a `select` of the same date observes the save.
//! - In-flight requests always run to completion; there is no cancellation.
//! - Dropping the worker drains queued requests and joins the thread.

use crate::db::{open_db, DbResult};
use crate::model::entry::{DateKey, Entry};
use crate::repo::entry_repo::{EntryRepository, RepoError, RepoResult, SqliteEntryRepository};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce(&Connection) + Send + 'static>;

/// Completion handle for one submitted store request.
#[derive(Debug)]
pub struct Pending<T> {
    rx: Receiver<RepoResult<T>>,
}

impl<T> Pending<T> {
    /// Blocks until the request completes.
    pub fn wait(self) -> RepoResult<T> {
        self.rx.recv().unwrap_or(Err(RepoError::WorkerStopped))
    }

    /// Returns the result when the request already completed.
    ///
    /// Returns `None` while the request is still queued or running.
    pub fn try_take(&mut self) -> Option<RepoResult<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(RepoError::WorkerStopped)),
        }
    }
}

/// Entry store running on its own thread.
pub struct StoreWorker {
    sender: Option<Sender<Job>>,
    thread: Option<JoinHandle<()>>,
}

impl StoreWorker {
    /// Opens the database file on the calling thread, then moves it to the worker.
    ///
    /// Open/schema failures surface here so hosts can stop before presenting
    /// a non-functional editor.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let conn = open_db(path)?;
        Ok(Self::spawn(conn))
    }

    /// Starts a worker thread that owns `conn`.
    pub fn spawn(conn: Connection) -> Self {
        let (sender, receiver) = mpsc::channel::<Job>();
        let spawned = thread::Builder::new()
            .name("diary-store".to_string())
            .spawn(move || {
                info!("event=store_worker module=repo status=start");
                for job in receiver {
                    job(&conn);
                }
                info!("event=store_worker module=repo status=stop");
            });

        match spawned {
            Ok(handle) => Self {
                sender: Some(sender),
                thread: Some(handle),
            },
            Err(err) => {
                // Without a thread every request resolves to `WorkerStopped`.
                error!(
                    "event=store_worker module=repo status=error error_code=spawn_failed error={err}"
                );
                Self {
                    sender: None,
                    thread: None,
                }
            }
        }
    }

    /// Queues `get` for `date`.
    pub fn submit_get(&self, date: DateKey) -> Pending<Option<Entry>> {
        self.submit(move |repo| repo.get_entry(date))
    }

    /// Queues `upsert` for `date`.
    pub fn submit_upsert(&self, date: DateKey, body: impl Into<String>) -> Pending<()> {
        let body = body.into();
        self.submit(move |repo| repo.upsert_entry(date, body.as_str()))
    }

    /// Queues `delete` for `date`.
    pub fn submit_delete(&self, date: DateKey) -> Pending<()> {
        self.submit(move |repo| repo.delete_entry(date))
    }

    /// Queues a full key enumeration.
    pub fn submit_list_dates(&self) -> Pending<Vec<DateKey>> {
        self.submit(|repo| repo.list_dates())
    }

    fn submit<T, F>(&self, op: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteEntryRepository<'_>) -> RepoResult<T> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let job: Job = Box::new(move |conn: &Connection| {
            let repo = SqliteEntryRepository::new(conn);
            // Receiver may have been dropped by a caller that stopped caring.
            let _ = tx.send(op(&repo));
        });

        if let Some(sender) = self.sender.as_ref() {
            // A failed send drops the job and its reply sender, so `rx`
            // reports `WorkerStopped` to the caller.
            let _ = sender.send(job);
        }

        Pending { rx }
    }
}

impl EntryRepository for StoreWorker {
    fn get_entry(&self, date: DateKey) -> RepoResult<Option<Entry>> {
        self.submit_get(date).wait()
    }

    fn upsert_entry(&self, date: DateKey, body: &str) -> RepoResult<()> {
        self.submit_upsert(date, body).wait()
    }

    fn delete_entry(&self, date: DateKey) -> RepoResult<()> {
        self.submit_delete(date).wait()
    }

    fn list_dates(&self) -> RepoResult<Vec<DateKey>> {
        self.submit_list_dates().wait()
    }
}

impl Drop for StoreWorker {
    fn drop(&mut self) {
        drop(self.sender.take());
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                error!("event=store_worker module=repo status=error error_code=join_failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StoreWorker;
    use crate::db::open_db_in_memory;
    use crate::model::entry::DateKey;
    use crate::repo::entry_repo::RepoError;

    fn key(value: &str) -> DateKey {
        value.parse().expect("valid date key")
    }

    #[test]
    fn queued_requests_complete_in_submission_order() {
        let worker = StoreWorker::spawn(open_db_in_memory().expect("open db"));
        let date = key("2024-03-01");

        let first = worker.submit_upsert(date, "hello");
        let second = worker.submit_upsert(date, "world");
        let read = worker.submit_get(date);

        first.wait().expect("first upsert");
        second.wait().expect("second upsert");
        let entry = read.wait().expect("get").expect("entry should exist");
        assert_eq!(entry.body, "world");
    }

    #[test]
    fn try_take_eventually_yields_result() {
        let worker = StoreWorker::spawn(open_db_in_memory().expect("open db"));
        let mut pending = worker.submit_list_dates();
        let result = loop {
            if let Some(result) = pending.try_take() {
                break result;
            }
            std::thread::yield_now();
        };
        assert!(result.expect("list dates").is_empty());
    }

    #[test]
    fn validation_errors_come_back_through_the_handle() {
        let worker = StoreWorker::spawn(open_db_in_memory().expect("open db"));
        let err = worker
            .submit_upsert(key("2024-03-01"), "   ")
            .wait()
            .expect_err("blank body must be rejected");
        assert!(matches!(err, RepoError::Validation(_)));
    }
}

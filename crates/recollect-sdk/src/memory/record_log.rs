//! SQLite-backed record log adapter.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use recollect_core::memory::RecordLog;
use recollect_core::{CommitGate, Database, Error, ExchangeId, ExchangeRecord, NewExchange, Result};

use crate::utils::run_blocking;

/// SQLite's own lock wait, kept under the caller's bound so a locked log
/// fails inside the transaction rather than after the caller gave up.
pub fn busy_timeout_for(storage_timeout: Duration) -> Duration {
    storage_timeout.saturating_sub(storage_timeout / 5)
}

/// [`RecordLog`] over a [`Database`], each call bounded by `timeout`.
#[derive(Clone)]
pub struct SqliteRecordLog {
    db: Arc<Database>,
    timeout: Duration,
}

impl SqliteRecordLog {
    pub fn new(db: Arc<Database>, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    /// Open (or create) the log at `path`
    pub fn open(path: &Path, timeout: Duration) -> Result<Self> {
        let db = Database::open_path(path)?;
        db.set_busy_timeout(busy_timeout_for(timeout))?;
        Ok(Self::new(Arc::new(db), timeout))
    }

    pub fn open_in_memory(timeout: Duration) -> Result<Self> {
        Ok(Self::new(Arc::new(Database::open_in_memory()?), timeout))
    }

    /// The underlying database handle
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }
}

#[async_trait]
impl RecordLog for SqliteRecordLog {
    /// Bounded like every other call, but a timed-out append never commits:
    /// the waiter and the writer race on a [`CommitGate`] and exactly one wins.
    async fn append(&self, exchange: &NewExchange) -> Result<ExchangeRecord> {
        let db = self.db.clone();
        let exchange = exchange.clone();
        let gate = Arc::new(CommitGate::new());
        let writer_gate = gate.clone();

        let mut task =
            tokio::task::spawn_blocking(move || db.append_exchange_gated(&exchange, &writer_gate));

        let waited = tokio::time::timeout(self.timeout, &mut task).await;
        let joined = match waited {
            Ok(joined) => joined,
            Err(_) if gate.abandon() => {
                return Err(Error::timeout("record_log.append", self.timeout.as_millis() as u64));
            }
            Err(_) => {
                tracing::debug!("Append timed out mid-commit; waiting for its outcome");
                task.await
            }
        };
        joined.map_err(|e| Error::Other(format!("record_log.append task failed: {}", e)))?
    }

    async fn fetch_by_ids(&self, ids: &[ExchangeId]) -> Result<HashMap<ExchangeId, ExchangeRecord>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let db = self.db.clone();
        let ids = ids.to_vec();
        run_blocking("record_log.fetch_by_ids", self.timeout, move || db.get_exchanges_by_ids(&ids)).await
    }

    async fn get(&self, id: ExchangeId) -> Result<Option<ExchangeRecord>> {
        let db = self.db.clone();
        run_blocking("record_log.get", self.timeout, move || db.get_exchange(id)).await
    }

    async fn list_session(&self, session_id: &str, limit: usize) -> Result<Vec<ExchangeRecord>> {
        let db = self.db.clone();
        let session_id = session_id.to_string();
        run_blocking("record_log.list_session", self.timeout, move || {
            db.list_session_exchanges(&session_id, limit)
        })
        .await
    }

    async fn count(&self) -> Result<u64> {
        let db = self.db.clone();
        run_blocking("record_log.count", self.timeout, move || db.count_exchanges()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log() -> SqliteRecordLog {
        SqliteRecordLog::open_in_memory(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_append_and_fetch() {
        let log = log();
        let first = log
            .append(&NewExchange::new("s1", "a castle", Some("A stone castle".into())))
            .await
            .unwrap();
        let second = log.append(&NewExchange::new("s1", "a dragon", None)).await.unwrap();
        assert!(second.id > first.id);

        let missing = ExchangeId::new(999).unwrap();
        let fetched = log.fetch_by_ids(&[second.id, missing, first.id]).await.unwrap();
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[&first.id].enhanced_prompt.as_deref(), Some("A stone castle"));
        assert_eq!(log.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_fetch_empty_ids() {
        assert!(log().fetch_by_ids(&[]).await.unwrap().is_empty());
    }

    #[test]
    fn test_busy_timeout_stays_under_storage_timeout() {
        let storage = Duration::from_millis(500);
        assert!(busy_timeout_for(storage) < storage);
        assert_eq!(busy_timeout_for(Duration::ZERO), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_append_against_locked_log_leaves_no_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.db");
        let log = SqliteRecordLog::open(&path, Duration::from_millis(200)).unwrap();

        let (locked_tx, locked_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let holder_path = path.clone();
        let holder = std::thread::spawn(move || {
            let other = rusqlite::Connection::open(&holder_path).unwrap();
            other.execute_batch("BEGIN IMMEDIATE").unwrap();
            locked_tx.send(()).unwrap();
            release_rx.recv().unwrap();
            other.execute_batch("ROLLBACK").unwrap();
        });
        locked_rx.recv().unwrap();

        let err = log
            .append(&NewExchange::new("s1", "a castle", Some("A stone castle".into())))
            .await
            .unwrap_err();
        assert!(err.is_timeout() || err.is_storage_write(), "unexpected error: {}", err);

        release_tx.send(()).unwrap();
        holder.join().unwrap();

        // Give an abandoned writer time to finish; it must not have committed
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(log.count().await.unwrap(), 0);

        let record = log.append(&NewExchange::new("s1", "a castle", None)).await.unwrap();
        assert_eq!(log.count().await.unwrap(), 1);
        assert_eq!(log.get(record.id).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_get_and_list_session() {
        let log = log();
        let a = log.append(&NewExchange::new("s1", "one", None)).await.unwrap();
        log.append(&NewExchange::new("s2", "other", None)).await.unwrap();
        let b = log.append(&NewExchange::new("s1", "two", None)).await.unwrap();

        assert_eq!(log.get(a.id).await.unwrap(), Some(a.clone()));
        let listed = log.list_session("s1", 10).await.unwrap();
        assert_eq!(listed.iter().map(|r| r.id).collect::<Vec<_>>(), vec![a.id, b.id]);
    }
}

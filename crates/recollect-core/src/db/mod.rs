//! Direct SQLite access for the record log.
//!
//! The record log is append-only: this module exposes no update or delete.
//! Ids come from `AUTOINCREMENT`, timestamps are clamped so they never go
//! backwards relative to earlier ids.

pub mod migrations;

use crate::error::{Error, Result};
use crate::types::{ExchangeId, ExchangeRecord, NewExchange};
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Upper bound on ids bound into a single `IN (...)` clause
const FETCH_CHUNK: usize = 500;

/// How long a write waits on another process's lock before SQLITE_BUSY
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const GATE_OPEN: u8 = 0;
const GATE_COMMITTING: u8 = 1;
const GATE_ABANDONED: u8 = 2;

/// Decides, exactly once, whether an append commits or is abandoned.
///
/// The writer calls [`begin_commit`](Self::begin_commit) right before
/// `COMMIT`; a waiter that gives up calls [`abandon`](Self::abandon). Only one
/// of the two can win, so a caller told "timed out" never has a committed row.
#[derive(Debug, Default)]
pub struct CommitGate {
    state: AtomicU8,
}

impl CommitGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the right to commit. `false` means the append was abandoned.
    pub fn begin_commit(&self) -> bool {
        self.state
            .compare_exchange(GATE_OPEN, GATE_COMMITTING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Give up on the append. `false` means the commit is already under way
    /// and its result must be awaited.
    pub fn abandon(&self) -> bool {
        self.state
            .compare_exchange(GATE_OPEN, GATE_ABANDONED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Database connection wrapper.
///
/// Thread-safe via internal Mutex. All database operations acquire the lock.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the record log at a specific path
    pub fn open_path(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path).map_err(Error::Database)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
        Self::from_connection(conn)
    }

    /// Open a throwaway in-memory record log
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(Error::Database)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::LockPoisoned)
    }

    /// Bound how long statements wait on locks held by other connections
    pub fn set_busy_timeout(&self, timeout: Duration) -> Result<()> {
        let conn = self.lock()?;
        conn.busy_timeout(timeout)?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Exchange Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a new exchange and return the committed record.
    ///
    /// Every failure surfaces as [`Error::StorageWrite`]; no id exists in that case.
    pub fn append_exchange(&self, exchange: &NewExchange) -> Result<ExchangeRecord> {
        self.append_exchange_gated(exchange, &CommitGate::new())
    }

    /// Append unless `gate` is abandoned before the commit starts.
    ///
    /// An abandoned append rolls back and returns [`Error::StorageWrite`].
    pub fn append_exchange_gated(&self, exchange: &NewExchange, gate: &CommitGate) -> Result<ExchangeRecord> {
        self.try_append(exchange, gate).map_err(|e| match e {
            Error::StorageWrite(_) => e,
            other => Error::storage_write(other.to_string()),
        })
    }

    fn try_append(&self, exchange: &NewExchange, gate: &CommitGate) -> Result<ExchangeRecord> {
        let mut conn = self.lock()?;
        // Take the write lock up front so a concurrent writer makes us wait on
        // the busy handler instead of failing the read-to-write upgrade.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let last_created: Option<i64> = tx
            .query_row(
                "SELECT created_at FROM exchanges ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let now = Utc::now().timestamp_millis();
        let created_at = last_created.map_or(now, |last| last.max(now));

        tx.execute(
            "INSERT INTO exchanges (session_id, user_prompt, enhanced_prompt, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                &exchange.session_id,
                &exchange.user_prompt,
                &exchange.enhanced_prompt,
                created_at,
            ],
        )?;
        let raw_id = tx.last_insert_rowid();
        if !gate.begin_commit() {
            // Dropping the transaction rolls it back
            return Err(Error::storage_write("append abandoned before commit"));
        }
        tx.commit()?;
        tracing::debug!(id = raw_id, session_id = %exchange.session_id, "Appended exchange");

        Ok(ExchangeRecord {
            id: ExchangeId::new(raw_id)?,
            session_id: exchange.session_id.clone(),
            user_prompt: exchange.user_prompt.clone(),
            enhanced_prompt: exchange.enhanced_prompt.clone(),
            timestamp: millis_to_datetime(created_at),
        })
    }

    /// Get a single exchange by id
    pub fn get_exchange(&self, id: ExchangeId) -> Result<Option<ExchangeRecord>> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                "SELECT id, session_id, user_prompt, enhanced_prompt, created_at
                 FROM exchanges WHERE id = ?1",
                params![id.get()],
                Self::map_exchange,
            )
            .optional()?;
        Ok(record)
    }

    /// Batch lookup. Ids without a record are omitted from the map.
    pub fn get_exchanges_by_ids(
        &self,
        ids: &[ExchangeId],
    ) -> Result<HashMap<ExchangeId, ExchangeRecord>> {
        let mut found = HashMap::with_capacity(ids.len());
        if ids.is_empty() {
            return Ok(found);
        }

        let conn = self.lock()?;
        for chunk in ids.chunks(FETCH_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(",");
            let sql = format!(
                "SELECT id, session_id, user_prompt, enhanced_prompt, created_at
                 FROM exchanges WHERE id IN ({})",
                placeholders
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter().map(|id| id.get())), Self::map_exchange)?;
            for row in rows {
                let record = row?;
                found.insert(record.id, record);
            }
        }
        Ok(found)
    }

    /// List exchanges of one session in insertion order
    pub fn list_session_exchanges(&self, session_id: &str, limit: usize) -> Result<Vec<ExchangeRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, session_id, user_prompt, enhanced_prompt, created_at
             FROM exchanges WHERE session_id = ?1
             ORDER BY id ASC LIMIT ?2",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = stmt
            .query_map(params![session_id, limit], Self::map_exchange)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Total number of exchanges
    pub fn count_exchanges(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM exchanges", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Row Mappers
    // ─────────────────────────────────────────────────────────────────────────

    fn map_exchange(row: &Row) -> rusqlite::Result<ExchangeRecord> {
        let raw_id: i64 = row.get(0)?;
        let id = ExchangeId::new(raw_id).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Integer, Box::new(e))
        })?;
        Ok(ExchangeRecord {
            id,
            session_id: row.get(1)?,
            user_prompt: row.get(2)?,
            enhanced_prompt: row.get(3)?,
            timestamp: millis_to_datetime(row.get(4)?),
        })
    }
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

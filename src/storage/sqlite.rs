//! SQLite-backed gateway.
//!
//! All rows live in a single `cache_entries` table. Each gateway call is one
//! autocommitted statement executed on tokio's blocking pool.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use tracing::debug;

use super::gateway::{Predicate, StorageGateway, StoredRow};
use crate::error::{CacheError, Result};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS cache_entries (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        cache_key     TEXT    NOT NULL,
        payload       TEXT    NOT NULL,
        expires_at_ms INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_cache_entries_key ON cache_entries (cache_key);
    CREATE INDEX IF NOT EXISTS idx_cache_entries_expiry ON cache_entries (expires_at_ms);
";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// == SQLite Gateway ==
/// Gateway over one SQLite connection.
#[derive(Debug, Clone)]
pub struct SqliteGateway {
    conn: Arc<Mutex<Connection>>,
    location: Option<PathBuf>,
}

impl SqliteGateway {
    /// Opens (creating if needed) the database file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Self::init(conn, Some(path.as_ref().to_path_buf()))
    }

    /// Opens a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, location: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        debug!("SQLite cache table ready at {:?}", location);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            location,
        })
    }

    /// Database file backing this gateway, `None` when in memory.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| CacheError::Storage("connection lock poisoned".to_string()))?;
            f(&guard).map_err(CacheError::from)
        })
        .await
        .map_err(|e| CacheError::Storage(format!("storage task failed: {}", e)))?
    }
}

/// Renders a predicate as a WHERE clause with positional parameters.
fn where_clause(predicate: &Predicate) -> (&'static str, Vec<Value>) {
    match predicate {
        Predicate::KeyEquals(key) => ("cache_key = ?", vec![Value::Text(key.clone())]),
        Predicate::ExpiresAtOrBefore(at) => ("expires_at_ms <= ?", vec![Value::Integer(*at)]),
        Predicate::KeyExpiredBefore { key, cutoff_ms } => (
            "cache_key = ? AND expires_at_ms < ?",
            vec![Value::Text(key.clone()), Value::Integer(*cutoff_ms)],
        ),
        Predicate::KeyLiveAt { key, now_ms } => (
            "cache_key = ? AND expires_at_ms >= ?",
            vec![Value::Text(key.clone()), Value::Integer(*now_ms)],
        ),
        Predicate::KeyWithPayload {
            key,
            payload,
            live_at_ms,
        } => (
            "cache_key = ? AND payload = ? AND expires_at_ms >= ?",
            vec![
                Value::Text(key.clone()),
                Value::Text(payload.clone()),
                Value::Integer(*live_at_ms),
            ],
        ),
    }
}

#[async_trait]
impl StorageGateway for SqliteGateway {
    async fn insert(&self, row: StoredRow) -> Result<i64> {
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO cache_entries (cache_key, payload, expires_at_ms) VALUES (?1, ?2, ?3)",
                params![row.key, row.payload, row.expires_at_ms],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn update_where(&self, predicate: Predicate, row: StoredRow) -> Result<u64> {
        let (clause, filter) = where_clause(&predicate);
        let sql = format!(
            "UPDATE cache_entries SET cache_key = ?, payload = ?, expires_at_ms = ? WHERE {}",
            clause
        );
        let mut values = vec![
            Value::Text(row.key),
            Value::Text(row.payload),
            Value::Integer(row.expires_at_ms),
        ];
        values.extend(filter);

        self.with_conn(move |conn| {
            let affected = conn.execute(&sql, params_from_iter(values.iter()))?;
            Ok(affected as u64)
        })
        .await
    }

    async fn delete_where(&self, predicate: Predicate) -> Result<u64> {
        let (clause, values) = where_clause(&predicate);
        let sql = format!("DELETE FROM cache_entries WHERE {}", clause);

        self.with_conn(move |conn| {
            let affected = conn.execute(&sql, params_from_iter(values.iter()))?;
            Ok(affected as u64)
        })
        .await
    }

    async fn query_where(&self, predicate: Predicate) -> Result<Vec<StoredRow>> {
        let (clause, values) = where_clause(&predicate);
        let sql = format!(
            "SELECT cache_key, payload, expires_at_ms FROM cache_entries WHERE {} ORDER BY id",
            clause
        );

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values.iter()), |r| {
                Ok(StoredRow {
                    key: r.get(0)?,
                    payload: r.get(1)?,
                    expires_at_ms: r.get(2)?,
                })
            })?;
            rows.collect()
        })
        .await
    }

    async fn count(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM cache_entries", [], |r| r.get(0))?;
            Ok(count as u64)
        })
        .await
    }
}

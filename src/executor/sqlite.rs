//! SQLite-backed [`Executor`] for local use and tests.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rusqlite::{
    Connection, params_from_iter,
    types::{ToSqlOutput, ValueRef},
    ToSql,
};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    error::{DriverError, DriverResult},
    query::Statement,
    result::{QueryMeta, QueryResult, Row},
    types::SqlValue,
};

use super::Executor;

/// Connection settings applied when an executor is opened.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// `PRAGMA journal_mode`. In-memory databases ignore `WAL`.
    pub journal_mode: String,
    /// `PRAGMA synchronous`.
    pub synchronous: String,
    /// How long a statement waits on a locked database.
    pub busy_timeout_ms: u64,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            journal_mode: "WAL".to_string(),
            synchronous: "NORMAL".to_string(),
            busy_timeout_ms: 5_000,
        }
    }
}

/// Executor owning a single SQLite connection.
///
/// Statements run on the blocking thread pool so async callers never stall.
/// Cloning shares the connection.
#[derive(Clone)]
pub struct SqliteExecutor {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteExecutor {
    /// Opens or creates a database file at `path`.
    pub fn open(path: impl AsRef<Path>, config: SqliteConfig) -> DriverResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn, &config)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory(config: SqliteConfig) -> DriverResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn, &config)
    }

    fn init_connection(conn: Connection, config: &SqliteConfig) -> DriverResult<Self> {
        let mode: String = conn.pragma_update_and_check(
            None,
            "journal_mode",
            &config.journal_mode,
            |row| row.get(0),
        )?;
        conn.pragma_update(None, "synchronous", &config.synchronous)?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        debug!(journal_mode = %mode, synchronous = %config.synchronous, "sqlite connection ready");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs raw SQL such as the caller's own `CREATE TABLE` statements.
    pub async fn execute_batch(&self, sql: &str) -> DriverResult<()> {
        let conn = Arc::clone(&self.conn);
        let sql = sql.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            conn.execute_batch(&sql)
        })
        .await
        .map_err(|e| DriverError::Join(e.to_string()))??;
        Ok(())
    }

    async fn execute(&self, statement: &Statement) -> DriverResult<QueryResult> {
        let conn = Arc::clone(&self.conn);
        let statement = statement.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            execute_blocking(&conn, &statement)
        })
        .await
        .map_err(|e| DriverError::Join(e.to_string()))?
    }
}

impl Executor for SqliteExecutor {
    async fn all(&self, statement: &Statement) -> DriverResult<QueryResult> {
        self.execute(statement).await
    }

    async fn run(&self, statement: &Statement) -> DriverResult<QueryResult> {
        self.execute(statement).await
    }
}

fn execute_blocking(conn: &Connection, statement: &Statement) -> DriverResult<QueryResult> {
    let started = Instant::now();
    let mut stmt = conn.prepare(&statement.sql)?;
    let readonly = stmt.readonly();
    let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();

    let mut results = Vec::new();
    if columns.is_empty() {
        stmt.execute(params_from_iter(statement.params.iter()))?;
    } else {
        let mut rows = stmt.query(params_from_iter(statement.params.iter()))?;
        while let Some(row) = rows.next()? {
            let mut out = Row::new();
            for (idx, name) in columns.iter().enumerate() {
                let value = SqlValue::from(row.get_ref(idx)?);
                out.insert(name.clone(), value.to_json());
            }
            results.push(out);
        }
    }

    let meta = QueryMeta {
        changes: if readonly { 0 } else { conn.changes() as u64 },
        last_row_id: conn.last_insert_rowid(),
        rows_read: results.len() as u64,
        duration_ms: started.elapsed().as_secs_f64() * 1_000.0,
    };
    Ok(QueryResult::ok(results, meta))
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Borrowed(match self {
            Self::Null => ValueRef::Null,
            Self::Integer(i) => ValueRef::Integer(*i),
            Self::Real(f) => ValueRef::Real(*f),
            Self::Text(s) => ValueRef::Text(s.as_bytes()),
            Self::Blob(b) => ValueRef::Blob(b),
        }))
    }
}

impl From<ValueRef<'_>> for SqlValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(i) => Self::Integer(i),
            ValueRef::Real(f) => Self::Real(f),
            ValueRef::Text(t) => Self::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Self::Blob(b.to_vec()),
        }
    }
}

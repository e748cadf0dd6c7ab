//! Uniform result shape returned by every driver call.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// One result row: column name to JSON value, in column order.
pub type Row = Map<String, JsonValue>;

/// Execution metadata reported alongside results.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryMeta {
    /// Rows inserted, updated, or deleted. Zero for reads.
    pub changes: u64,
    /// Rowid of the most recent successful insert on the connection.
    pub last_row_id: i64,
    /// Rows returned to the caller.
    pub rows_read: u64,
    /// Wall time spent executing, in milliseconds.
    pub duration_ms: f64,
}

/// `{ success, results, meta }` as returned by the executor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryResult {
    /// False only for caller errors detected before execution.
    pub success: bool,
    /// Matching rows; empty, never absent, when nothing matched.
    pub results: Vec<Row>,
    /// Execution metadata.
    pub meta: QueryMeta,
    /// Caller-error message when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResult {
    /// Successful result carrying `results`.
    pub fn ok(results: Vec<Row>, meta: QueryMeta) -> Self {
        Self {
            success: true,
            results,
            meta,
            error: None,
        }
    }

    /// Caller-error result with no rows.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            results: Vec::new(),
            meta: QueryMeta::default(),
            error: Some(message.into()),
        }
    }
}

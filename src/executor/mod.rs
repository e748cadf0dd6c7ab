pub mod sqlite;

use std::future::Future;

use crate::{error::DriverResult, query::Statement, result::QueryResult};

/// Database handle that runs translated statements.
///
/// Mirrors the `prepare(sql).bind(params...).all()/.run()` contract of a
/// hosted SQLite-compatible database. Errors from the store are returned
/// as-is; the driver never retries.
pub trait Executor: Send + Sync {
    /// Runs a read and returns every row.
    fn all(&self, statement: &Statement) -> impl Future<Output = DriverResult<QueryResult>> + Send;

    /// Runs a write. Rows are returned only for statements with `RETURNING`.
    fn run(&self, statement: &Statement) -> impl Future<Output = DriverResult<QueryResult>> + Send;
}

//! Error type shared by the translator, driver, and executors.

use thiserror::Error;

/// Errors produced while translating or executing a CRUD call.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Insert or update was called with no columns.
    #[error("entity for table '{table}' has no columns")]
    EmptyEntity {
        /// Target table.
        table: String,
    },

    /// Identifier rejected by strict identifier checking.
    #[error("invalid identifier '{0}': must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidIdentifier(String),

    /// JSON input value that has no scalar SQL representation.
    #[error("unsupported value for column '{column}': expected a scalar")]
    UnsupportedValue {
        /// Offending column.
        column: String,
    },

    /// JSON input that is not an object.
    #[error("expected a JSON object of column values")]
    NotAnObject,

    /// Failure reported by SQLite.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Blocking task running the statement panicked or was cancelled.
    #[error("join error: {0}")]
    Join(String),
}

impl DriverError {
    /// True for errors caused by the caller's arguments rather than the store.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyEntity { .. }
                | Self::InvalidIdentifier(_)
                | Self::UnsupportedValue { .. }
                | Self::NotAnObject
        )
    }
}

/// Convenience alias for results with [`DriverError`].
pub type DriverResult<T> = Result<T, DriverError>;

//! Object-shaped CRUD calls composed from the translator and an executor.
//!
//! Caller errors (an empty entity, or an identifier rejected under
//! [`DriverConfig::strict_identifiers`]) come back as a `success: false`
//! [`QueryResult`] so every call has the same result shape. Store errors are
//! returned unchanged as `Err`.

use tracing::{debug, warn};

use crate::{
    error::{DriverError, DriverResult},
    executor::Executor,
    query::{self, ALL_FIELDS, DEFAULT_SOFT_DELETE_COLUMN, Statement},
    result::QueryResult,
    types::{Conditions, Entity},
};

/// Driver behavior switches.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Column stamped with `CURRENT_TIMESTAMP` by a soft delete.
    pub soft_delete_column: String,
    /// Reject table, column, and projection names that are not plain identifiers.
    pub strict_identifiers: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            soft_delete_column: DEFAULT_SOFT_DELETE_COLUMN.to_string(),
            strict_identifiers: false,
        }
    }
}

/// Executor paired with a [`DriverConfig`].
pub struct D1Driver<E> {
    db: E,
    config: DriverConfig,
}

impl<E: Executor> D1Driver<E> {
    /// Driver with the default configuration.
    pub fn new(db: E) -> Self {
        Self::with_config(db, DriverConfig::default())
    }

    /// Driver with an explicit configuration.
    pub fn with_config(db: E, config: DriverConfig) -> Self {
        Self { db, config }
    }

    /// Underlying executor.
    pub fn executor(&self) -> &E {
        &self.db
    }

    /// Active configuration.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Selects `fields` (default `*`) from `table` matching `conditions`.
    pub async fn get(
        &self,
        table: &str,
        conditions: Option<&Conditions>,
        fields: Option<&str>,
    ) -> DriverResult<QueryResult> {
        get_with(&self.db, &self.config, table, conditions, fields).await
    }

    /// Inserts `entity` into `table`.
    pub async fn create(&self, table: &str, entity: &Entity) -> DriverResult<QueryResult> {
        create_with(&self.db, &self.config, table, entity).await
    }

    /// Updates rows of `table` matching `conditions` with `entity`.
    pub async fn update(
        &self,
        table: &str,
        entity: &Entity,
        conditions: Option<&Conditions>,
    ) -> DriverResult<QueryResult> {
        update_with(&self.db, &self.config, table, entity, conditions).await
    }

    /// Deletes, or soft deletes, rows of `table` matching `conditions`.
    pub async fn remove(
        &self,
        table: &str,
        conditions: Option<&Conditions>,
        soft_remove: bool,
    ) -> DriverResult<QueryResult> {
        remove_with(&self.db, &self.config, table, conditions, soft_remove).await
    }
}

/// Selects rows using the default configuration.
pub async fn get<E: Executor>(
    db: &E,
    table: &str,
    conditions: Option<&Conditions>,
    fields: Option<&str>,
) -> DriverResult<QueryResult> {
    get_with(db, &DriverConfig::default(), table, conditions, fields).await
}

/// Inserts a row using the default configuration.
pub async fn create<E: Executor>(db: &E, table: &str, entity: &Entity) -> DriverResult<QueryResult> {
    create_with(db, &DriverConfig::default(), table, entity).await
}

/// Updates rows using the default configuration.
pub async fn update<E: Executor>(
    db: &E,
    table: &str,
    entity: &Entity,
    conditions: Option<&Conditions>,
) -> DriverResult<QueryResult> {
    update_with(db, &DriverConfig::default(), table, entity, conditions).await
}

/// Deletes or soft deletes rows using the default configuration.
pub async fn remove<E: Executor>(
    db: &E,
    table: &str,
    conditions: Option<&Conditions>,
    soft_remove: bool,
) -> DriverResult<QueryResult> {
    remove_with(db, &DriverConfig::default(), table, conditions, soft_remove).await
}

async fn get_with<E: Executor>(
    db: &E,
    config: &DriverConfig,
    table: &str,
    conditions: Option<&Conditions>,
    fields: Option<&str>,
) -> DriverResult<QueryResult> {
    let fields = fields.unwrap_or(ALL_FIELDS);
    let columns = conditions
        .into_iter()
        .flat_map(Conditions::iter)
        .map(|(c, _)| c);
    let checked =
        check_identifiers(config, table, columns).and_then(|()| check_projection(config, fields));
    let stmt = match checked {
        Ok(()) => query::build_select(table, conditions, fields),
        Err(err) => return caller_error(table, err),
    };
    trace_statement("get", table, &stmt);
    db.all(&stmt).await
}

async fn create_with<E: Executor>(
    db: &E,
    config: &DriverConfig,
    table: &str,
    entity: &Entity,
) -> DriverResult<QueryResult> {
    let stmt = match check_identifiers(config, table, entity.iter().map(|(c, _)| c))
        .and_then(|()| query::build_insert(table, entity))
    {
        Ok(stmt) => stmt,
        Err(err) => return caller_error(table, err),
    };
    trace_statement("create", table, &stmt);
    db.run(&stmt).await
}

async fn update_with<E: Executor>(
    db: &E,
    config: &DriverConfig,
    table: &str,
    entity: &Entity,
    conditions: Option<&Conditions>,
) -> DriverResult<QueryResult> {
    let columns = entity
        .iter()
        .map(|(c, _)| c)
        .chain(conditions.into_iter().flat_map(Conditions::iter).map(|(c, _)| c));
    let stmt = match check_identifiers(config, table, columns)
        .and_then(|()| query::build_update(table, entity, conditions))
    {
        Ok(stmt) => stmt,
        Err(err) => return caller_error(table, err),
    };
    warn_if_unconditioned("update", table, conditions);
    trace_statement("update", table, &stmt);
    db.run(&stmt).await
}

async fn remove_with<E: Executor>(
    db: &E,
    config: &DriverConfig,
    table: &str,
    conditions: Option<&Conditions>,
    soft_remove: bool,
) -> DriverResult<QueryResult> {
    let columns = std::iter::once(config.soft_delete_column.as_str())
        .filter(|_| soft_remove)
        .chain(conditions.into_iter().flat_map(Conditions::iter).map(|(c, _)| c));
    if let Err(err) = check_identifiers(config, table, columns) {
        return caller_error(table, err);
    }
    let stmt = query::build_delete_with_column(
        table,
        conditions,
        soft_remove,
        &config.soft_delete_column,
    );
    warn_if_unconditioned("remove", table, conditions);
    trace_statement("remove", table, &stmt);
    db.run(&stmt).await
}

fn caller_error(table: &str, err: DriverError) -> DriverResult<QueryResult> {
    if err.is_caller_error() {
        warn!(table, error = %err, "rejected call");
        Ok(QueryResult::failure(err.to_string()))
    } else {
        Err(err)
    }
}

fn trace_statement(op: &str, table: &str, stmt: &Statement) {
    debug!(op, table, sql = %stmt.sql, params = stmt.params.len(), "executing statement");
}

fn warn_if_unconditioned(op: &str, table: &str, conditions: Option<&Conditions>) {
    if conditions.is_none_or(Conditions::is_empty) {
        warn!(op, table, "no conditions given; statement applies to every row");
    }
}

fn check_identifiers<'a>(
    config: &DriverConfig,
    table: &'a str,
    columns: impl IntoIterator<Item = &'a str>,
) -> DriverResult<()> {
    if !config.strict_identifiers {
        return Ok(());
    }
    std::iter::once(table)
        .chain(columns)
        .try_for_each(validate_identifier)
}

fn check_projection(config: &DriverConfig, fields: &str) -> DriverResult<()> {
    if !config.strict_identifiers || fields.trim() == ALL_FIELDS {
        return Ok(());
    }
    fields.split(',').map(str::trim).try_for_each(validate_identifier)
}

/// Checks that `name` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_identifier(name: &str) -> DriverResult<()> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DriverError::InvalidIdentifier(name.to_string()))
    }
}

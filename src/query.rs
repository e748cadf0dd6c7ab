//! Translation of CRUD calls into parameterized SQL.
//!
//! Every function here is pure: it returns a [`Statement`] and never touches
//! a database. User values are always bound as `?` parameters. Table names,
//! column names, and the projection string are written into the SQL as-is and
//! must come from trusted code.
//!
//! An empty or absent condition map produces no `WHERE` clause, so an update
//! or delete without conditions applies to every row in the table.
//!
//! ```
//! use d1crud::{query::build_select, types::{Conditions, SqlValue}};
//!
//! let conds = Conditions::new().with("author", "ada").with("deletedAt", SqlValue::Null);
//! let stmt = build_select("blog", Some(&conds), "id, title");
//! assert_eq!(stmt.sql, "SELECT id, title FROM blog WHERE author = ? AND deletedAt IS NULL");
//! assert_eq!(stmt.params, vec![SqlValue::from("ada")]);
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    error::{DriverError, DriverResult},
    types::{Conditions, Entity, FieldValue, SqlKeyword, SqlValue},
};

/// Default projection.
pub const ALL_FIELDS: &str = "*";
/// Column stamped by a soft delete unless configured otherwise.
pub const DEFAULT_SOFT_DELETE_COLUMN: &str = "deletedAt";

/// SQL text plus its bound parameters in placeholder order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// SQL with `?` placeholders.
    pub sql: String,
    /// One value per placeholder.
    pub params: Vec<SqlValue>,
}

impl Statement {
    fn new(sql: String) -> Self {
        Self {
            sql,
            params: Vec::new(),
        }
    }

    fn push_where(&mut self, conditions: Option<&Conditions>) {
        let Some(conditions) = conditions.filter(|c| !c.is_empty()) else {
            return;
        };

        let mut clauses = Vec::with_capacity(conditions.len());
        for (column, value) in conditions.iter() {
            if value.is_null() {
                clauses.push(format!("{column} IS NULL"));
            } else {
                clauses.push(format!("{column} = ?"));
                self.params.push(value.clone());
            }
        }
        self.sql.push_str(" WHERE ");
        self.sql.push_str(&clauses.join(" AND "));
    }
}

/// `SELECT {fields} FROM {table} [WHERE ...]`.
pub fn build_select(table: &str, conditions: Option<&Conditions>, fields: &str) -> Statement {
    let mut stmt = Statement::new(format!("SELECT {fields} FROM {table}"));
    stmt.push_where(conditions);
    stmt
}

/// `INSERT INTO {table} (cols) VALUES (...)`.
///
/// Fails with [`DriverError::EmptyEntity`] when `entity` has no columns.
pub fn build_insert(table: &str, entity: &Entity) -> DriverResult<Statement> {
    ensure_columns(table, entity)?;

    let mut columns = Vec::with_capacity(entity.len());
    let mut values = Vec::with_capacity(entity.len());
    let mut params = Vec::with_capacity(entity.len());
    for (column, value) in entity.iter() {
        columns.push(column);
        values.push(bind(value, &mut params));
    }

    Ok(Statement {
        sql: format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            columns.join(", "),
            values.join(", ")
        ),
        params,
    })
}

/// `UPDATE {table} SET col = ?, ... [WHERE ...]`.
///
/// Parameters are the entity values followed by the non-NULL condition values.
pub fn build_update(
    table: &str,
    entity: &Entity,
    conditions: Option<&Conditions>,
) -> DriverResult<Statement> {
    ensure_columns(table, entity)?;

    let mut params = Vec::with_capacity(entity.len());
    let assignments: Vec<String> = entity
        .iter()
        .map(|(column, value)| format!("{column} = {}", bind(value, &mut params)))
        .collect();

    let mut stmt = Statement {
        sql: format!("UPDATE {table} SET {}", assignments.join(", ")),
        params,
    };
    stmt.push_where(conditions);
    Ok(stmt)
}

/// `DELETE FROM {table} [WHERE ...]`, or a soft delete stamping `deletedAt`.
pub fn build_delete(table: &str, conditions: Option<&Conditions>, soft_remove: bool) -> Statement {
    build_delete_with_column(table, conditions, soft_remove, DEFAULT_SOFT_DELETE_COLUMN)
}

/// [`build_delete`] with a caller-chosen soft delete column.
pub fn build_delete_with_column(
    table: &str,
    conditions: Option<&Conditions>,
    soft_remove: bool,
    soft_delete_column: &str,
) -> Statement {
    let sql = if soft_remove {
        format!(
            "UPDATE {table} SET {soft_delete_column} = {}",
            SqlKeyword::CurrentTimestamp.as_sql()
        )
    } else {
        format!("DELETE FROM {table}")
    };
    let mut stmt = Statement::new(sql);
    stmt.push_where(conditions);
    stmt
}

fn ensure_columns(table: &str, entity: &Entity) -> DriverResult<()> {
    if entity.is_empty() {
        return Err(DriverError::EmptyEntity {
            table: table.to_string(),
        });
    }
    Ok(())
}

fn bind(value: &FieldValue, params: &mut Vec<SqlValue>) -> String {
    match value {
        FieldValue::Keyword(keyword) => keyword.as_sql().to_string(),
        FieldValue::Value(v) => {
            params.push(v.clone());
            "?".to_string()
        }
    }
}

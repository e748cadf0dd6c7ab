//! Scalar values and the ordered column maps fed to the translator.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{DriverError, DriverResult};

/// String sentinel that entity values may use in place of [`SqlKeyword::CurrentTimestamp`].
pub const CURRENT_TIMESTAMP: &str = "CURRENT_TIMESTAMP";

/// Scalar bound as a statement parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    /// SQL NULL.
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Returns true for [`SqlValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Converts a JSON scalar. Arrays and objects have no SQL scalar form.
    pub fn from_json(column: &str, value: &JsonValue) -> DriverResult<Self> {
        match value {
            JsonValue::Null => Ok(Self::Null),
            JsonValue::Bool(b) => Ok(Self::from(*b)),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Ok(Self::Integer(i)),
                None => n.as_f64().map(Self::Real).ok_or_else(|| DriverError::UnsupportedValue {
                    column: column.to_string(),
                }),
            },
            JsonValue::String(s) => Ok(Self::Text(s.clone())),
            JsonValue::Array(_) | JsonValue::Object(_) => Err(DriverError::UnsupportedValue {
                column: column.to_string(),
            }),
        }
    }

    /// Converts to the JSON shape used for result rows. Blobs become byte arrays.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Integer(i) => JsonValue::from(*i),
            // Non-finite floats have no JSON form.
            Self::Real(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Self::Text(s) => JsonValue::String(s.clone()),
            Self::Blob(b) => JsonValue::Array(b.iter().map(|v| JsonValue::from(*v)).collect()),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for SqlValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

/// SQL keyword emitted verbatim instead of being bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlKeyword {
    /// `CURRENT_TIMESTAMP`.
    CurrentTimestamp,
}

impl SqlKeyword {
    /// SQL text for the keyword.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::CurrentTimestamp => CURRENT_TIMESTAMP,
        }
    }
}

/// Entity column value: either bound or a bare keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Bound as a `?` parameter.
    Value(SqlValue),
    /// Emitted as raw SQL.
    Keyword(SqlKeyword),
}

impl<T: Into<SqlValue>> From<T> for FieldValue {
    fn from(value: T) -> Self {
        match value.into() {
            SqlValue::Text(s) if s == CURRENT_TIMESTAMP => Self::Keyword(SqlKeyword::CurrentTimestamp),
            other => Self::Value(other),
        }
    }
}

impl From<SqlKeyword> for FieldValue {
    fn from(value: SqlKeyword) -> Self {
        Self::Keyword(value)
    }
}

/// Ordered column to value mapping used to build `WHERE` clauses.
///
/// Clause order follows insertion order. Setting an existing column replaces
/// its value without moving it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Conditions {
    entries: Vec<(String, SqlValue)>,
}

impl Conditions {
    /// Empty condition map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Conditions::set`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.set(column, value);
        self
    }

    /// Inserts or replaces the value for `column`.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) {
        upsert(&mut self.entries, column.into(), value.into());
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no columns are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds conditions from a JSON object, keeping key order.
    pub fn from_json(value: &JsonValue) -> DriverResult<Self> {
        let object = value.as_object().ok_or(DriverError::NotAnObject)?;
        let mut out = Self::new();
        for (column, v) in object {
            out.set(column.clone(), SqlValue::from_json(column, v)?);
        }
        Ok(out)
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for Conditions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (k, v) in iter {
            out.set(k, v);
        }
        out
    }
}

/// Ordered column to value mapping used as an insert or update payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Entity {
    entries: Vec<(String, FieldValue)>,
}

impl Entity {
    /// Empty entity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Entity::set`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(column, value);
        self
    }

    /// Inserts or replaces the value for `column`.
    ///
    /// Text exactly equal to `"CURRENT_TIMESTAMP"` becomes
    /// [`SqlKeyword::CurrentTimestamp`].
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<FieldValue>) {
        upsert(&mut self.entries, column.into(), value.into());
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no columns are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds an entity from a JSON object, keeping key order.
    pub fn from_json(value: &JsonValue) -> DriverResult<Self> {
        let object = value.as_object().ok_or(DriverError::NotAnObject)?;
        let mut out = Self::new();
        for (column, v) in object {
            out.set(column.clone(), SqlValue::from_json(column, v)?);
        }
        Ok(out)
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Entity {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (k, v) in iter {
            out.set(k, v);
        }
        out
    }
}

fn upsert<V>(entries: &mut Vec<(String, V)>, column: String, value: V) {
    match entries.iter_mut().find(|(k, _)| *k == column) {
        Some(slot) => slot.1 = value,
        None => entries.push((column, value)),
    }
}

//! Parameterized statements and raw rows
//!
//! The store never concatenates values into SQL text. A [`Statement`] pairs
//! SQL with named `:name` bindings; the engine collaborator performs the
//! actual parameter binding for its driver. Results come back as [`Row`]s,
//! column-name keyed JSON values, which the entity mapper turns into records.

use serde_json::Value;
use std::collections::BTreeMap;

/// Named parameter bindings for one statement
pub type Params = BTreeMap<String, Value>;

/// A parameterized SQL statement
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// SQL text with `:name` placeholders
    pub sql: String,
    /// Values for the named placeholders
    pub params: Params,
}

impl Statement {
    /// Statement with no bindings
    pub fn new(sql: impl Into<String>) -> Self {
        Statement {
            sql: sql.into(),
            params: Params::new(),
        }
    }

    /// Statement with prepared bindings
    pub fn with_params(sql: impl Into<String>, params: Params) -> Self {
        Statement {
            sql: sql.into(),
            params,
        }
    }

    /// Add one binding, builder style
    pub fn bind(mut self, name: impl Into<String>, value: Value) -> Self {
        self.params.insert(name.into(), value);
        self
    }
}

/// One raw result row: column name to JSON value
///
/// The engine collaborator is expected to render `content` as a JSON object,
/// `createdat` as an RFC 3339 string or epoch-millis number, and everything
/// else as scalars.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: BTreeMap<String, Value>,
}

impl Row {
    /// Empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value, builder style
    pub fn col(mut self, name: impl Into<String>, value: Value) -> Self {
        self.columns.insert(name.into(), value);
        self
    }

    /// Raw column value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.get(name)
    }

    /// Column value as a string slice
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.columns.get(name).and_then(Value::as_str)
    }

    /// Column value as an integer
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.columns.get(name).and_then(Value::as_i64)
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Row {
            columns: iter.into_iter().collect(),
        }
    }
}

//! Structured filter predicates
//!
//! A [`Filter`] maps field names to [`DataQuery`] predicates and compiles to
//! a conjunction of SQL fragments over the JSON `content` column. Bare
//! scalars are sugar for equality via the `From` impls.

use serde_json::Value;
use std::collections::BTreeMap;

/// A single filter predicate over one field
///
/// All comparisons address `content` sub-fields unless a column-specific
/// compiler is registered for the field. Numeric bound values compare
/// numerically, everything else as text.
#[derive(Debug, Clone, PartialEq)]
pub enum DataQuery {
    /// Equality
    Eq(Value),
    /// Strictly greater than
    Gt(Value),
    /// Greater than or equal
    Gte(Value),
    /// Strictly less than
    Lt(Value),
    /// Less than or equal
    Lte(Value),
    /// Set membership over the bound array
    In(Vec<Value>),
    /// Inclusive range over two bounds
    Between(Value, Value),
    /// JSON containment of the bound fragment
    Object(Value),
    /// Case-insensitive substring match on a nested field
    Like {
        /// Dot-path addressing the nested field inside `content`
        path: Vec<String>,
        /// Substring to match, wrapped in wildcards at compile time
        like: String,
    },
}

impl DataQuery {
    /// True when the predicate binds no usable value
    ///
    /// Such predicates are omitted at compile time with a diagnostic
    /// warning, instead of producing an `= NULL` fragment that could never
    /// match.
    pub fn is_null_value(&self) -> bool {
        match self {
            DataQuery::Eq(v)
            | DataQuery::Gt(v)
            | DataQuery::Gte(v)
            | DataQuery::Lt(v)
            | DataQuery::Lte(v)
            | DataQuery::Object(v) => v.is_null(),
            DataQuery::Between(lo, hi) => lo.is_null() || hi.is_null(),
            DataQuery::In(values) => values.is_empty(),
            DataQuery::Like { like, .. } => like.is_empty(),
        }
    }
}

impl From<&str> for DataQuery {
    fn from(value: &str) -> Self {
        DataQuery::Eq(Value::from(value))
    }
}

impl From<String> for DataQuery {
    fn from(value: String) -> Self {
        DataQuery::Eq(Value::from(value))
    }
}

impl From<i64> for DataQuery {
    fn from(value: i64) -> Self {
        DataQuery::Eq(Value::from(value))
    }
}

impl From<f64> for DataQuery {
    fn from(value: f64) -> Self {
        DataQuery::Eq(Value::from(value))
    }
}

impl From<bool> for DataQuery {
    fn from(value: bool) -> Self {
        DataQuery::Eq(Value::from(value))
    }
}

impl From<Value> for DataQuery {
    fn from(value: Value) -> Self {
        DataQuery::Eq(value)
    }
}

/// Filter map: field name to predicate, combined by AND
///
/// Insertion order is irrelevant to the result; a BTreeMap keeps the
/// compiled SQL deterministic.
pub type Filter = BTreeMap<String, DataQuery>;

/// Build a filter from `(field, predicate)` pairs
pub fn filter<I, K, Q>(entries: I) -> Filter
where
    I: IntoIterator<Item = (K, Q)>,
    K: Into<String>,
    Q: Into<DataQuery>,
{
    entries
        .into_iter()
        .map(|(k, q)| (k.into(), q.into()))
        .collect()
}

//! Filter-to-SQL compilation
//!
//! Translates a [`Filter`] into a conjunction of parameterized predicate
//! fragments over the JSON `content` column. Dispatch is a closed match per
//! operator, with an open extension point: fields that live in real columns
//! can register their own [`ColumnCompiler`].
//!
//! Reserved parameter names (`xxx_workspace_id`, `xxx_type`, `xxx_id`,
//! `xxx_createdat`, `xxx_content`) carry the implicit scoping and key
//! bindings. Caller field names are validated to `[A-Za-z0-9_]+`, so they
//! can never collide with the reserved prefix or escape their quoting.

use docstore_core::{DataQuery, Filter, Params, Result, StoreError};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

/// Reserved binding for the workspace scope predicate
pub const PARAM_WORKSPACE: &str = "xxx_workspace_id";
/// Reserved binding for the type scope predicate
pub const PARAM_TYPE: &str = "xxx_type";
/// Reserved binding for exact-id lookups
pub const PARAM_ID: &str = "xxx_id";
/// Reserved binding for the creation timestamp on insert
pub const PARAM_CREATED_AT: &str = "xxx_createdat";
/// Reserved binding for the content payload on insert/update
pub const PARAM_CONTENT: &str = "xxx_content";

/// Compiled WHERE conjunction: predicate fragments plus their bindings
///
/// `clause` is either empty or a sequence of ` and <fragment>` segments,
/// ready to append after the scoped base query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledWhere {
    /// Leading-` and` predicate fragments, empty when no filter applies
    pub clause: String,
    /// Named bindings referenced by the fragments
    pub params: Params,
}

/// Fragment builder for a field backed by a real column
///
/// Receives the field name and predicate, pushes bindings, and returns the
/// predicate fragment (without a leading `and`). Returning an error flags a
/// contract violation instead of silently producing an empty fragment.
pub type ColumnCompiler =
    Box<dyn Fn(&str, &DataQuery, &mut Params) -> Result<String> + Send + Sync>;

/// Compiles filter maps into WHERE conjunctions
///
/// Stateless apart from the column-compiler registry; one instance is shared
/// by all store operations.
#[derive(Default)]
pub struct QueryCompiler {
    columns: HashMap<String, ColumnCompiler>,
}

impl QueryCompiler {
    /// Compiler with no column overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a column-specific compiler for one field
    ///
    /// Fields without an override compile against the JSON `content` column.
    pub fn register_column(&mut self, field: impl Into<String>, compiler: ColumnCompiler) {
        self.columns.insert(field.into(), compiler);
    }

    /// Compile a filter into predicate fragments and bindings
    ///
    /// Null-valued predicates are omitted with a diagnostic warning rather
    /// than compiled to `= NULL`, which would match nothing.
    pub fn compile(&self, filter: &Filter) -> Result<CompiledWhere> {
        let mut out = CompiledWhere::default();

        for (field, query) in filter {
            validate_field(field)?;

            if query.is_null_value() {
                warn!(field = %field, "omitting null-valued filter predicate");
                continue;
            }

            let fragment = match self.columns.get(field.as_str()) {
                Some(custom) => custom(field, query, &mut out.params)?,
                None => json_fragment(field, query, &mut out.params)?,
            };

            out.clause.push_str(" and ");
            out.clause.push_str(&fragment);
        }

        Ok(out)
    }
}

/// Validate a caller-supplied field name
///
/// Field names are spliced into quoted JSON accessors, so anything outside
/// `[A-Za-z0-9_]` is rejected up front.
pub fn validate_field(name: &str) -> Result<()> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(StoreError::InvalidField(name.to_string()));
    }
    Ok(())
}

fn is_numeric(value: &Value) -> bool {
    value.is_number()
}

/// Text or numeric accessor for one content field
///
/// Numeric bound values get a `::numeric` cast on the extracted text so
/// comparisons behave numerically instead of lexically.
fn accessor(field: &str, numeric: bool) -> String {
    if numeric {
        format!("(content->>'{}')::numeric", field)
    } else {
        format!("content->>'{}'", field)
    }
}

/// Default JSON-path fragment builder, one arm per operator
fn json_fragment(field: &str, query: &DataQuery, params: &mut Params) -> Result<String> {
    let fragment = match query {
        DataQuery::Eq(v) => comparison(field, "=", v, params),
        DataQuery::Gt(v) => comparison(field, ">", v, params),
        DataQuery::Gte(v) => comparison(field, ">=", v, params),
        DataQuery::Lt(v) => comparison(field, "<", v, params),
        DataQuery::Lte(v) => comparison(field, "<=", v, params),
        DataQuery::In(values) => {
            let numeric = values.iter().all(is_numeric);
            params.insert(field.to_string(), Value::Array(values.clone()));
            format!("{} = ANY(:{})", accessor(field, numeric), field)
        }
        DataQuery::Between(lo, hi) => {
            let numeric = is_numeric(lo) && is_numeric(hi);
            params.insert(format!("{}_0", field), lo.clone());
            params.insert(format!("{}_1", field), hi.clone());
            format!(
                "{} between :{}_0 and :{}_1",
                accessor(field, numeric),
                field,
                field
            )
        }
        DataQuery::Object(v) => {
            params.insert(field.to_string(), v.clone());
            format!("content @> :{}", field)
        }
        DataQuery::Like { path, like } => {
            for segment in path {
                validate_field(segment)?;
            }
            params.insert(field.to_string(), Value::from(format!("%{}%", like)));
            format!("content #>> '{{{}}}' ILIKE :{}", path.join(","), field)
        }
    };
    Ok(fragment)
}

fn comparison(field: &str, op: &str, value: &Value, params: &mut Params) -> String {
    let numeric = is_numeric(value);
    params.insert(field.to_string(), value.clone());
    format!("{} {} :{}", accessor(field, numeric), op, field)
}

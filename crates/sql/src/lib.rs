//! Filter-to-SQL compiler and pagination builder
//!
//! Pure functions from structured requests to parameterized SQL:
//! - `compiler`: filter map -> WHERE conjunction + named bindings, with a
//!   per-column extension registry
//! - `order`: sort spec -> ORDER BY, page request -> LIMIT/OFFSET
//! - `statements`: skeletons for the select/insert/update/delete/truncate
//!   statements issued by the store operations
//!
//! Nothing in this crate touches a connection; execution belongs to the
//! engine collaborator.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compiler;
pub mod order;
pub mod statements;

pub use compiler::{
    validate_field, ColumnCompiler, CompiledWhere, QueryCompiler, PARAM_CONTENT, PARAM_CREATED_AT,
    PARAM_ID, PARAM_TYPE, PARAM_WORKSPACE,
};
pub use order::{order_by, page_clause};
pub use statements::FULL_COUNT_COLUMN;

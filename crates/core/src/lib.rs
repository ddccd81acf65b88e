//! Core types and traits for the document store
//!
//! This crate defines the foundation shared by the SQL compiler and the
//! store engine:
//! - Record: a stored document (id, type, timestamp, JSON content)
//! - DataQuery / Filter: structured filter predicates
//! - SortSpec / PageRequest / PagedRecords: ordering and pagination
//! - TransactionData / TransactionOptions: transaction-visible handles
//! - Statement / Row: parameterized SQL and raw results
//! - StoreError / EngineError: the error taxonomy
//! - SqlEngine / SqlTransaction / IdGenerator: collaborator seams

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod query;
pub mod statement;
pub mod traits;
pub mod types;

pub use error::{BoxError, EngineError, EngineResult, Result, StoreError};
pub use query::{filter, DataQuery, Filter};
pub use statement::{Params, Row, Statement};
pub use traits::{IdGenerator, SqlEngine, SqlTransaction, UuidIds};
pub use types::{
    PageInfo, PageRequest, PagedRecords, Propagation, Record, SortDirection, SortSpec,
    TransactionData, TransactionOptions,
};

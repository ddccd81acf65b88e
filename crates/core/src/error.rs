//! Error types for the document store
//!
//! Two layers of errors exist:
//! - [`EngineError`]: raised by the SQL engine collaborator (connection,
//!   statement execution, closed transaction handles).
//! - [`StoreError`]: the store's own taxonomy. Engine failures fold into it
//!   via `From`.
//!
//! Absence of a row is never an error; single-entity lookups return
//! `Option<Record>` and `None` is the canonical not-found signal.

use std::error::Error as StdError;
use thiserror::Error;

/// Boxed error type used for caller-classified business errors.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Result type alias for engine collaborator calls
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Errors raised by the SQL engine collaborator
#[derive(Debug, Error)]
pub enum EngineError {
    /// Could not reach the database or acquire a connection
    #[error("connection failure: {0}")]
    Connection(String),

    /// A statement failed during execution
    #[error("statement failed: {0}")]
    Statement(String),

    /// The transaction handle was already committed or rolled back
    #[error("transaction handle is closed")]
    Closed,
}

/// Error taxonomy for store operations
///
/// Propagation policy:
/// - read-path operations (`find_entity*`) log and degrade to empty results
///   instead of surfacing these;
/// - write-path and single-entity operations propagate them.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Caller violated an API contract; rejected before any I/O
    #[error("validation failed: {0}")]
    Validation(String),

    /// More than one row matched a single-entity lookup
    ///
    /// Indicates a uniqueness-invariant breach upstream. Fatal, never
    /// collapsed into a single record.
    #[error("found {matches} matching records for {record_type}/{id}")]
    Consistency {
        /// Logical record type of the lookup
        record_type: String,
        /// Id that matched more than once
        id: String,
        /// Number of rows returned
        matches: usize,
    },

    /// Infrastructure failure from the SQL engine collaborator
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// Caller-classified business error
    ///
    /// When raised inside a transaction body, the transaction still commits;
    /// the error is surfaced to the outer caller after commit completes.
    #[error("business rule rejected: {0}")]
    Business(BoxError),

    /// A row could not be mapped into a [`crate::Record`]
    #[error("row mapping failed: {0}")]
    Mapping(String),

    /// A filter or sort field name is not a valid identifier
    #[error("invalid field name: {0:?}")]
    InvalidField(String),

    /// An operation ran through a scope whose transaction already settled
    #[error("transaction scope is no longer active")]
    TransactionClosed,
}

impl StoreError {
    /// Build a validation error from any message
    pub fn validation(msg: impl Into<String>) -> Self {
        StoreError::Validation(msg.into())
    }

    /// Wrap a domain error as a business error
    pub fn business(err: impl Into<BoxError>) -> Self {
        StoreError::Business(err.into())
    }

    /// True when this error is a [`StoreError::Business`] variant
    ///
    /// The default classifier used by the transaction manager.
    pub fn is_business(&self) -> bool {
        matches!(self, StoreError::Business(_))
    }
}

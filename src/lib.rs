//! docstore: transactional JSON document store over a relational table
//!
//! A document-style CRUD adapter backed by a relational table with a JSON
//! payload column. Callers store typed records (id, type, created-at,
//! free-form content) and query them with a structured filter language that
//! compiles to parameterized SQL over the JSON column, optionally scoped by
//! a workspace/tenant id.
//!
//! The two load-bearing pieces:
//! - **Explicit ambient transactions**: `transaction()` hands its closure a
//!   [`StoreScope`]; every operation on that scope silently participates in
//!   the enclosing transaction, and nested `transaction()` calls join it
//!   unless they ask for `requires_new`. Business-classified errors commit
//!   before surfacing; everything else rolls back.
//! - **Filter-to-SQL compilation**: filter maps become parameterized WHERE
//!   conjunctions with numeric coercion, containment and nested-path
//!   matching; sort specs and page requests become deterministic ORDER
//!   BY / LIMIT / OFFSET clauses with a windowed total count.
//!
//! The SQL engine itself (pool, driver, binding) stays behind the
//! [`SqlEngine`] trait; ids come from an injectable [`IdGenerator`].
//!
//! # Example
//!
//! ```ignore
//! use docstore::{filter, DocumentStore, SortSpec, TransactionOptions};
//! use serde_json::json;
//!
//! let store = DocumentStore::builder(engine).workspaces(false).build();
//!
//! let record = store
//!     .create_entity(None, "order", json!({"amount": 5, "status": "open"}))
//!     .await?
//!     .expect("created row readable");
//!
//! let open = store
//!     .find_entity(None, "order", &filter([("status", "open")]), &SortSpec::new())
//!     .await;
//!
//! store
//!     .transaction(
//!         |scope| async move {
//!             scope.delete_entity(None, "order", &record.id).await?;
//!             Ok(())
//!         },
//!         TransactionOptions::default(),
//!     )
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use docstore_core::{
    filter, BoxError, DataQuery, EngineError, EngineResult, Filter, IdGenerator, PageInfo,
    PageRequest, PagedRecords, Params, Propagation, Record, Result, Row, SortDirection, SortSpec,
    SqlEngine, SqlTransaction, Statement, StoreError, TransactionData, TransactionOptions, UuidIds,
};
pub use docstore_engine::{
    map_row, BusinessClassifier, DocumentStore, DocumentStoreBuilder, StoreConfig, StoreScope,
    TableResolver, TransactionEvent, TransactionListener,
};
pub use docstore_sql::{
    order_by, page_clause, validate_field, ColumnCompiler, CompiledWhere, QueryCompiler,
};

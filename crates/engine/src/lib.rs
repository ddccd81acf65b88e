//! Transaction context manager and store operations
//!
//! The store engine orchestrates the pure pieces (query compiler,
//! pagination builder, entity mapper) against the injected SQL engine
//! collaborator:
//! - `store`: the `DocumentStore` facade, builder and configuration
//! - `scope`: explicit ambient-transaction scopes and the CRUD operations
//! - `events`: synchronous transaction lifecycle listeners
//! - `mapper`: raw row to `Record`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod events;
pub mod mapper;
pub mod scope;
pub mod store;

pub use config::StoreConfig;
pub use events::{TransactionEvent, TransactionListener};
pub use mapper::map_row;
pub use scope::StoreScope;
pub use store::{BusinessClassifier, DocumentStore, DocumentStoreBuilder, TableResolver};

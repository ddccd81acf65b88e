//! Document store facade and builder
//!
//! `DocumentStore` is a stateless facade: it holds only an `Arc` of shared
//! internals (engine, config, compiler, id source, listeners) and hands out
//! [`StoreScope`]s. Operations called directly on the store run on the root
//! scope, outside any transaction; operations inside a `transaction()`
//! closure run on the child scope they receive.

use crate::config::StoreConfig;
use crate::events::{Listeners, TransactionEvent, TransactionListener};
use crate::scope::StoreScope;
use docstore_core::{
    Filter, IdGenerator, PageRequest, PagedRecords, Record, Result, SortSpec, Statement,
    StoreError, TransactionOptions, UuidIds,
};
use docstore_sql::{statements, ColumnCompiler, QueryCompiler};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::warn;

/// Predicate deciding whether an error is a recognized business error
pub type BusinessClassifier = Arc<dyn Fn(&StoreError) -> bool + Send + Sync>;

/// Per-type table name resolution hook
pub type TableResolver = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Shared internals behind every scope of one store
pub(crate) struct StoreInner<E: docstore_core::SqlEngine> {
    pub(crate) engine: E,
    pub(crate) config: StoreConfig,
    pub(crate) ids: Box<dyn IdGenerator>,
    pub(crate) compiler: QueryCompiler,
    pub(crate) listeners: Listeners,
    pub(crate) classify_business: BusinessClassifier,
    table_resolver: Option<TableResolver>,
}

impl<E: docstore_core::SqlEngine> StoreInner<E> {
    pub(crate) fn table_for(&self, record_type: &str) -> String {
        match &self.table_resolver {
            Some(resolver) => resolver(record_type),
            None => self.config.table.clone(),
        }
    }
}

/// Transactional document store over a relational table with a JSON column
///
/// Cheap to clone; clones share engine, configuration and listeners.
///
/// # Example
///
/// ```ignore
/// let store = DocumentStore::builder(engine).workspaces(true).build();
///
/// let created = store
///     .create_entity(Some("ws-1"), "order", json!({"amount": 5}))
///     .await?;
///
/// store
///     .transaction(
///         |scope| async move {
///             let order = scope.get_entity(Some("ws-1"), "order", &id).await?;
///             // ... more work on the same transaction ...
///             Ok(())
///         },
///         TransactionOptions::default(),
///     )
///     .await?;
/// ```
pub struct DocumentStore<E: docstore_core::SqlEngine> {
    inner: Arc<StoreInner<E>>,
}

impl<E: docstore_core::SqlEngine> Clone for DocumentStore<E> {
    fn clone(&self) -> Self {
        DocumentStore {
            inner: self.inner.clone(),
        }
    }
}

impl<E: docstore_core::SqlEngine> DocumentStore<E> {
    /// Store with default configuration
    pub fn new(engine: E) -> Self {
        Self::builder(engine).build()
    }

    /// Configure a store step by step
    pub fn builder(engine: E) -> DocumentStoreBuilder<E> {
        DocumentStoreBuilder {
            engine,
            config: StoreConfig::default(),
            ids: Box::new(UuidIds),
            compiler: QueryCompiler::new(),
            classify_business: Arc::new(|err| err.is_business()),
            table_resolver: None,
        }
    }

    /// Root execution scope, outside any transaction
    pub fn scope(&self) -> StoreScope<E> {
        StoreScope {
            inner: self.inner.clone(),
            tx: None,
        }
    }

    /// Register a synchronous transaction lifecycle listener
    pub fn on(
        &self,
        event: TransactionEvent,
        listener: impl Fn(&docstore_core::TransactionData) + Send + Sync + 'static,
    ) -> &Self {
        self.inner.listeners.register(event, Box::new(listener) as TransactionListener);
        self
    }

    /// Liveness probe against the engine
    ///
    /// Never errors: a failed probe logs a warning and reports `false`.
    pub async fn is_connected(&self) -> bool {
        use docstore_core::SqlEngine;

        match self.inner.engine.ping().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "liveness check failed");
                false
            }
        }
    }

    /// Unconditionally truncate the primary and backup tables
    ///
    /// Test/reset use only. Runs ad hoc on the engine, outside any
    /// transaction scope.
    pub async fn purge(&self) -> Result<()> {
        use docstore_core::SqlEngine;

        for table in [&self.inner.config.table, &self.inner.config.backup_table] {
            self.inner
                .engine
                .execute(&Statement::new(statements::truncate(table)))
                .await?;
            warn!(table = %table, "truncated datastore table");
        }
        Ok(())
    }

    // ========================================================================
    // Root-scope delegation
    // ========================================================================

    /// See [`StoreScope::transaction`]
    pub async fn transaction<T, F, Fut>(&self, exec: F, options: TransactionOptions) -> Result<T>
    where
        F: FnOnce(StoreScope<E>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.scope().transaction(exec, options).await
    }

    /// See [`StoreScope::get_entity`]
    pub async fn get_entity(
        &self,
        workspace: Option<&str>,
        record_type: &str,
        id: &str,
    ) -> Result<Option<Record>> {
        self.scope().get_entity(workspace, record_type, id).await
    }

    /// See [`StoreScope::find_entity`]
    pub async fn find_entity(
        &self,
        workspace: Option<&str>,
        record_type: &str,
        filter: &Filter,
        sort: &SortSpec,
    ) -> Vec<Record> {
        self.scope()
            .find_entity(workspace, record_type, filter, sort)
            .await
    }

    /// See [`StoreScope::find_entity_paginated`]
    pub async fn find_entity_paginated(
        &self,
        workspace: Option<&str>,
        record_type: &str,
        filter: &Filter,
        sort: &SortSpec,
        page: PageRequest,
    ) -> PagedRecords {
        self.scope()
            .find_entity_paginated(workspace, record_type, filter, sort, page)
            .await
    }

    /// See [`StoreScope::create_entity`]
    pub async fn create_entity(
        &self,
        workspace: Option<&str>,
        record_type: &str,
        content: Value,
    ) -> Result<Option<Record>> {
        self.scope()
            .create_entity(workspace, record_type, content)
            .await
    }

    /// See [`StoreScope::save_entity`]
    pub async fn save_entity(
        &self,
        workspace: Option<&str>,
        record_type: &str,
        record: Record,
    ) -> Result<Record> {
        self.scope()
            .save_entity(workspace, record_type, record)
            .await
    }

    /// See [`StoreScope::delete_entity`]
    pub async fn delete_entity(
        &self,
        workspace: Option<&str>,
        record_type: &str,
        id: &str,
    ) -> Result<u64> {
        self.scope().delete_entity(workspace, record_type, id).await
    }

    /// See [`StoreScope::delete_many`]
    pub async fn delete_many(
        &self,
        workspace: Option<&str>,
        record_type: &str,
        filter: &Filter,
    ) -> Result<()> {
        self.scope()
            .delete_many(workspace, record_type, filter)
            .await
    }
}

/// Builder for [`DocumentStore`]
pub struct DocumentStoreBuilder<E: docstore_core::SqlEngine> {
    engine: E,
    config: StoreConfig,
    ids: Box<dyn IdGenerator>,
    compiler: QueryCompiler,
    classify_business: BusinessClassifier,
    table_resolver: Option<TableResolver>,
}

impl<E: docstore_core::SqlEngine> DocumentStoreBuilder<E> {
    /// Enable or disable tenant scoping
    pub fn workspaces(mut self, enabled: bool) -> Self {
        self.config.workspaces = enabled;
        self
    }

    /// Enable verbose statement logging
    pub fn log_sql(mut self, enabled: bool) -> Self {
        self.config.log_sql = enabled;
        self
    }

    /// Override the primary table name
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.config.table = name.into();
        self
    }

    /// Override the backup table name
    pub fn backup_table(mut self, name: impl Into<String>) -> Self {
        self.config.backup_table = name.into();
        self
    }

    /// Resolve table names per record type
    pub fn table_resolver(
        mut self,
        resolver: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.table_resolver = Some(Arc::new(resolver));
        self
    }

    /// Replace the id generation capability
    pub fn id_generator(mut self, ids: impl IdGenerator) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Replace the business-error classifier
    ///
    /// The default recognizes only [`StoreError::Business`].
    pub fn business_errors(
        mut self,
        classify: impl Fn(&StoreError) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.classify_business = Arc::new(classify);
        self
    }

    /// Register a column-specific filter compiler for one field
    pub fn column_compiler(mut self, field: impl Into<String>, compiler: ColumnCompiler) -> Self {
        self.compiler.register_column(field, compiler);
        self
    }

    /// Finish the store
    pub fn build(self) -> DocumentStore<E> {
        DocumentStore {
            inner: Arc::new(StoreInner {
                engine: self.engine,
                config: self.config,
                ids: self.ids,
                compiler: self.compiler,
                listeners: Listeners::default(),
                classify_business: self.classify_business,
                table_resolver: self.table_resolver,
            }),
        }
    }
}

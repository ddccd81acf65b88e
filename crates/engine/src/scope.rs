//! Execution scopes and store operations
//!
//! A [`StoreScope`] is the ambient execution context for store operations.
//! The root scope (from `DocumentStore::scope()`) carries no transaction;
//! `transaction()` builds a child scope around a fresh engine handle and
//! passes it into the closure. Every operation invoked on that child scope
//! transparently executes through the enclosing transaction; operations on
//! the root scope run ad hoc against the engine.
//!
//! Context is propagated explicitly by scope passing, never through
//! thread-local or task-local state. Sibling `transaction()` calls can
//! never observe each other's scope; nested calls inherit exactly the scope
//! they were handed.
//!
//! ## Outcome classification
//!
//! A transaction body that returns `Ok` commits. An error recognized by the
//! injected business classifier also commits - the side effects stand - and
//! the error is surfaced to the caller after commit completes. Any other
//! error rolls the transaction back and propagates unchanged. The `Commit`
//! lifecycle event fires exactly once per scope, whichever way it settled.

use crate::events::TransactionEvent;
use crate::mapper;
use crate::store::StoreInner;
use docstore_core::{
    Filter, PageInfo, PagedRecords, Params, Propagation, Record, Result, Row, SortSpec, Statement,
    StoreError, TransactionData, TransactionOptions,
};
use docstore_sql::{order_by, page_clause, statements, PARAM_ID, PARAM_TYPE, PARAM_WORKSPACE};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

/// A live transaction shared by every scope joined to it
pub(crate) struct ActiveTransaction<E: docstore_core::SqlEngine> {
    pub(crate) id: String,
    pub(crate) data: Arc<TransactionData>,
    /// Engine handle; taken at settle time, `None` afterwards
    pub(crate) handle: Mutex<Option<E::Tx>>,
}

/// Ambient execution context for store operations
///
/// Cheap to clone; clones share the same store and the same (optional)
/// active transaction.
pub struct StoreScope<E: docstore_core::SqlEngine> {
    pub(crate) inner: Arc<StoreInner<E>>,
    pub(crate) tx: Option<Arc<ActiveTransaction<E>>>,
}

impl<E: docstore_core::SqlEngine> Clone for StoreScope<E> {
    fn clone(&self) -> Self {
        StoreScope {
            inner: self.inner.clone(),
            tx: self.tx.clone(),
        }
    }
}

impl<E: docstore_core::SqlEngine> StoreScope<E> {
    /// True when this scope participates in a transaction
    pub fn in_transaction(&self) -> bool {
        self.tx.is_some()
    }

    /// Transaction data of the enclosing transaction, if any
    pub fn transaction_data(&self) -> Option<Arc<TransactionData>> {
        self.tx.as_ref().map(|tx| tx.data.clone())
    }

    // ========================================================================
    // Transaction lifecycle
    // ========================================================================

    /// Run `exec` inside a transaction scope
    ///
    /// When this scope already carries a transaction and `options` does not
    /// demand a fresh one, `exec` joins it: it runs on a clone of the
    /// current scope, no new engine transaction is opened, and its result
    /// or error passes through unchanged. Otherwise a new engine
    /// transaction begins, a child scope wraps it, and the outcome is
    /// classified on exit.
    pub async fn transaction<T, F, Fut>(&self, exec: F, options: TransactionOptions) -> Result<T>
    where
        F: FnOnce(StoreScope<E>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(tx) = &self.tx {
            if options.propagation != Propagation::RequiresNew {
                debug!(transaction_id = %tx.id, "joining ambient transaction");
                return exec(self.clone()).await;
            }
            debug!(transaction_id = %tx.id, "ignoring ambient transaction (requires_new)");
        }

        let handle = self.inner.engine.begin().await?;
        let tx_id = self.inner.ids.generate();
        let data = Arc::new(TransactionData::new(tx_id.clone()));
        let active = Arc::new(ActiveTransaction::<E> {
            id: tx_id.clone(),
            data: data.clone(),
            handle: Mutex::new(Some(handle)),
        });
        let child = StoreScope {
            inner: self.inner.clone(),
            tx: Some(active.clone()),
        };

        debug!(transaction_id = %tx_id, "transaction started");
        self.inner.listeners.emit(TransactionEvent::Start, &data);

        let result = exec(child).await;
        let outcome = self.settle(&active, result).await;

        self.inner.listeners.emit(TransactionEvent::Commit, &data);
        outcome
    }

    /// Classify the body outcome and settle the engine handle
    async fn settle<T>(&self, active: &ActiveTransaction<E>, result: Result<T>) -> Result<T> {
        use docstore_core::SqlTransaction;

        let Some(handle) = active.handle.lock().await.take() else {
            // The handle can only be gone if a stale clone of this scope
            // already settled, which the scope structure rules out.
            return result.and(Err(StoreError::TransactionClosed));
        };

        match result {
            Ok(value) => {
                handle.commit().await?;
                debug!(transaction_id = %active.id, "transaction committed");
                Ok(value)
            }
            Err(err) if (self.inner.classify_business)(&err) => {
                // Domain-rule failure: side effects stand, the error is
                // still the caller's answer.
                handle.commit().await?;
                debug!(
                    transaction_id = %active.id,
                    error = %err,
                    "business error, committed before surfacing"
                );
                Err(err)
            }
            Err(err) => {
                debug!(transaction_id = %active.id, error = %err, "transaction rolled back");
                if let Err(rollback_err) = handle.rollback().await {
                    warn!(
                        transaction_id = %active.id,
                        error = %rollback_err,
                        "rollback failed"
                    );
                }
                Err(err)
            }
        }
    }

    // ========================================================================
    // Statement execution
    // ========================================================================

    fn maybe_log_sql(&self, stmt: &Statement) {
        if self.inner.config.log_sql {
            debug!(sql = %stmt.sql, params = ?stmt.params, "executing statement");
        }
    }

    /// Execute a row-returning statement through the ambient transaction
    /// when one exists, ad hoc otherwise
    async fn run_query(&self, stmt: &Statement) -> Result<Vec<Row>> {
        use docstore_core::SqlTransaction;

        self.maybe_log_sql(stmt);
        let rows = match &self.tx {
            Some(tx) => {
                let guard = tx.handle.lock().await;
                let handle = guard.as_ref().ok_or(StoreError::TransactionClosed)?;
                handle.query(stmt).await?
            }
            None => self.inner.engine.query(stmt).await?,
        };
        if self.inner.config.log_sql {
            debug!(rows = rows.len(), "statement returned");
        }
        Ok(rows)
    }

    /// Execute a row-count statement through the ambient transaction when
    /// one exists, ad hoc otherwise
    async fn run_execute(&self, stmt: &Statement) -> Result<u64> {
        use docstore_core::SqlTransaction;

        self.maybe_log_sql(stmt);
        let affected = match &self.tx {
            Some(tx) => {
                let guard = tx.handle.lock().await;
                let handle = guard.as_ref().ok_or(StoreError::TransactionClosed)?;
                handle.execute(stmt).await?
            }
            None => self.inner.engine.execute(stmt).await?,
        };
        Ok(affected)
    }

    // ========================================================================
    // Scoping helpers
    // ========================================================================

    fn table(&self, record_type: &str) -> String {
        self.inner.table_for(record_type)
    }

    fn workspaces(&self) -> bool {
        self.inner.config.workspaces
    }

    /// Reserved type/workspace bindings applied to every statement
    fn scope_params(&self, workspace: Option<&str>, record_type: &str) -> Result<Params> {
        let mut params = Params::new();
        params.insert(PARAM_TYPE.to_string(), Value::from(record_type));
        if self.workspaces() {
            let ws = workspace.ok_or_else(|| {
                StoreError::validation("workspace id required when workspaces are enabled")
            })?;
            params.insert(PARAM_WORKSPACE.to_string(), Value::from(ws));
        }
        Ok(params)
    }

    // ========================================================================
    // Store operations
    // ========================================================================

    /// Exact lookup by `(workspace?, type, id)`
    ///
    /// Zero rows is `None`. More than one row is a uniqueness-invariant
    /// breach and propagates as a consistency error.
    pub async fn get_entity(
        &self,
        workspace: Option<&str>,
        record_type: &str,
        id: &str,
    ) -> Result<Option<Record>> {
        let table = self.table(record_type);
        let mut params = self.scope_params(workspace, record_type)?;
        params.insert(PARAM_ID.to_string(), Value::from(id));

        let stmt = Statement::with_params(statements::select_by_id(&table, self.workspaces()), params);
        let rows = self.run_query(&stmt).await?;

        match rows.len() {
            0 => Ok(None),
            1 => mapper::map_row(&rows[0]).map(Some),
            matches => Err(StoreError::Consistency {
                record_type: record_type.to_string(),
                id: id.to_string(),
                matches,
            }),
        }
    }

    /// Find all records matching the filter, in sort order
    ///
    /// Read-path availability policy: any failure is logged and degrades to
    /// an empty result instead of propagating.
    pub async fn find_entity(
        &self,
        workspace: Option<&str>,
        record_type: &str,
        filter: &Filter,
        sort: &SortSpec,
    ) -> Vec<Record> {
        match self.try_find(workspace, record_type, filter, sort).await {
            Ok(records) => records,
            Err(err) => {
                error!(record_type, error = %err, "find_entity failed, returning empty result");
                Vec::new()
            }
        }
    }

    async fn try_find(
        &self,
        workspace: Option<&str>,
        record_type: &str,
        filter: &Filter,
        sort: &SortSpec,
    ) -> Result<Vec<Record>> {
        let table = self.table(record_type);
        let compiled = self.inner.compiler.compile(filter)?;

        let mut sql = statements::base_select(&table, self.workspaces());
        sql.push_str(&compiled.clause);
        sql.push_str(&order_by(sort)?);

        let mut params = self.scope_params(workspace, record_type)?;
        params.extend(compiled.params);

        let rows = self.run_query(&Statement::with_params(sql, params)).await?;
        rows.iter().map(mapper::map_row).collect()
    }

    /// Find one page of matching records plus the full match count
    ///
    /// Same degrade-to-empty policy as [`find_entity`](Self::find_entity);
    /// the fallback is an empty page with zero count, so a failed count can
    /// never crash a paging UI.
    pub async fn find_entity_paginated(
        &self,
        workspace: Option<&str>,
        record_type: &str,
        filter: &Filter,
        sort: &SortSpec,
        page: docstore_core::PageRequest,
    ) -> PagedRecords {
        match self
            .try_find_paginated(workspace, record_type, filter, sort, page)
            .await
        {
            Ok(paged) => paged,
            Err(err) => {
                error!(record_type, error = %err, "find_entity_paginated failed, returning empty page");
                PagedRecords::empty(page)
            }
        }
    }

    async fn try_find_paginated(
        &self,
        workspace: Option<&str>,
        record_type: &str,
        filter: &Filter,
        sort: &SortSpec,
        page: docstore_core::PageRequest,
    ) -> Result<PagedRecords> {
        let table = self.table(record_type);
        let compiled = self.inner.compiler.compile(filter)?;

        let mut sql = statements::base_select_counted(&table, self.workspaces());
        sql.push_str(&compiled.clause);
        sql.push_str(&order_by(sort)?);
        sql.push_str(&page_clause(page));

        let mut params = self.scope_params(workspace, record_type)?;
        params.extend(compiled.params);

        let rows = self.run_query(&Statement::with_params(sql, params)).await?;
        let total_count = rows.first().map(full_count).unwrap_or(0);
        let entries = rows.iter().map(mapper::map_row).collect::<Result<_>>()?;

        Ok(PagedRecords {
            total_count,
            entries,
            page_info: PageInfo {
                current_page: page.page,
                page_size: page.page_size,
            },
        })
    }

    /// Create a record with a server-assigned id and timestamp
    ///
    /// Rejects before any I/O when the caller already set `content.id`.
    /// The stored row is re-read through [`get_entity`](Self::get_entity)
    /// so the caller gets the canonical form back, whatever normalization
    /// the storage engine applied.
    pub async fn create_entity(
        &self,
        workspace: Option<&str>,
        record_type: &str,
        content: Value,
    ) -> Result<Option<Record>> {
        if content.get("id").is_some_and(|v| !v.is_null()) {
            return Err(StoreError::validation(
                "content.id is set, ids are server-assigned",
            ));
        }
        let Value::Object(mut fields) = content else {
            return Err(StoreError::validation("content must be a JSON object"));
        };

        let id = self.inner.ids.generate();
        let created_at = chrono::Utc::now();
        fields.insert("id".to_string(), Value::from(id.clone()));

        let table = self.table(record_type);
        let mut params = self.scope_params(workspace, record_type)?;
        params.insert(PARAM_ID.to_string(), Value::from(id.clone()));
        params.insert(
            docstore_sql::PARAM_CREATED_AT.to_string(),
            Value::from(created_at.to_rfc3339()),
        );
        params.insert(
            docstore_sql::PARAM_CONTENT.to_string(),
            Value::Object(fields),
        );

        let stmt = Statement::with_params(statements::insert(&table, self.workspaces()), params);
        self.run_execute(&stmt).await?;

        self.get_entity(workspace, record_type, &id).await
    }

    /// Replace the full content of an existing record
    ///
    /// No re-read and no version check; the input record is returned as
    /// confirmation. Optimistic-concurrency concerns stay with the caller.
    pub async fn save_entity(
        &self,
        workspace: Option<&str>,
        record_type: &str,
        record: Record,
    ) -> Result<Record> {
        let table = self.table(record_type);
        let mut params = self.scope_params(workspace, record_type)?;
        params.insert(PARAM_ID.to_string(), Value::from(record.id.clone()));
        params.insert(
            docstore_sql::PARAM_CONTENT.to_string(),
            record.content.clone(),
        );

        let stmt =
            Statement::with_params(statements::update_content(&table, self.workspaces()), params);
        self.run_execute(&stmt).await?;

        Ok(record)
    }

    /// Delete one record by exact key, returning the affected row count
    pub async fn delete_entity(
        &self,
        workspace: Option<&str>,
        record_type: &str,
        id: &str,
    ) -> Result<u64> {
        let table = self.table(record_type);
        let mut params = self.scope_params(workspace, record_type)?;
        params.insert(PARAM_ID.to_string(), Value::from(id));

        let stmt =
            Statement::with_params(statements::delete_by_id(&table, self.workspaces()), params);
        self.run_execute(&stmt).await
    }

    /// Delete every record matching the filter, scoped by type/workspace
    pub async fn delete_many(
        &self,
        workspace: Option<&str>,
        record_type: &str,
        filter: &Filter,
    ) -> Result<()> {
        let table = self.table(record_type);
        let compiled = self.inner.compiler.compile(filter)?;

        let mut params = self.scope_params(workspace, record_type)?;
        params.extend(compiled.params);

        let stmt = Statement::with_params(
            statements::delete_where(&table, self.workspaces(), &compiled.clause),
            params,
        );
        self.run_execute(&stmt).await?;
        Ok(())
    }
}

/// Extract the windowed full match count from a row
///
/// Engines may render `count(*)` as a number or a decimal string.
fn full_count(row: &Row) -> u64 {
    row.get_i64(statements::FULL_COUNT_COLUMN)
        .or_else(|| {
            row.get_str(statements::FULL_COUNT_COLUMN)
                .and_then(|s| s.parse().ok())
        })
        .map(|n| n.max(0) as u64)
        .unwrap_or(0)
}

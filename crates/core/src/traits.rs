//! Collaborator traits
//!
//! The store core depends on two injected capabilities:
//! - [`SqlEngine`]: execute a parameterized statement, optionally inside a
//!   transaction handle, and probe liveness. Connection pooling, drivers and
//!   real parameter binding all live behind this seam.
//! - [`IdGenerator`]: produce globally unique ids. Injectable so tests can
//!   use deterministic sequences.
//!
//! Transaction handles are consumed by `commit`/`rollback`; the transaction
//! context manager owns commit-on-return and rollback-on-error.

use crate::error::EngineResult;
use crate::statement::{Row, Statement};
use async_trait::async_trait;
use std::sync::Arc;

/// A transaction-scoped execution handle
///
/// All statements issued through one handle run on the same underlying
/// connection, in issue order. The handle is consumed by [`commit`] or
/// [`rollback`]; it never outlives the transaction scope.
///
/// [`commit`]: SqlTransaction::commit
/// [`rollback`]: SqlTransaction::rollback
#[async_trait]
pub trait SqlTransaction: Send + Sync + 'static {
    /// Execute a statement returning rows
    async fn query(&self, stmt: &Statement) -> EngineResult<Vec<Row>>;

    /// Execute a statement returning the affected row count
    async fn execute(&self, stmt: &Statement) -> EngineResult<u64>;

    /// Commit the transaction, consuming the handle
    async fn commit(self) -> EngineResult<()>;

    /// Roll the transaction back, consuming the handle
    async fn rollback(self) -> EngineResult<()>;
}

/// The SQL execution engine collaborator
#[async_trait]
pub trait SqlEngine: Send + Sync + 'static {
    /// Transaction handle type produced by [`begin`](SqlEngine::begin)
    type Tx: SqlTransaction;

    /// Execute an ad-hoc statement returning rows
    async fn query(&self, stmt: &Statement) -> EngineResult<Vec<Row>>;

    /// Execute an ad-hoc statement returning the affected row count
    async fn execute(&self, stmt: &Statement) -> EngineResult<u64>;

    /// Open a new transaction
    async fn begin(&self) -> EngineResult<Self::Tx>;

    /// Liveness probe
    async fn ping(&self) -> EngineResult<()>;
}

#[async_trait]
impl<E: SqlEngine> SqlEngine for Arc<E> {
    type Tx = E::Tx;

    async fn query(&self, stmt: &Statement) -> EngineResult<Vec<Row>> {
        (**self).query(stmt).await
    }

    async fn execute(&self, stmt: &Statement) -> EngineResult<u64> {
        (**self).execute(stmt).await
    }

    async fn begin(&self) -> EngineResult<Self::Tx> {
        (**self).begin().await
    }

    async fn ping(&self) -> EngineResult<()> {
        (**self).ping().await
    }
}

/// Injectable id generation capability
pub trait IdGenerator: Send + Sync + 'static {
    /// Produce a globally unique id
    fn generate(&self) -> String;
}

/// Default id generator backed by UUID v4
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

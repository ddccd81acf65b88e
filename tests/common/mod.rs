//! Shared test utilities for the integration test suites.
//!
//! Provides a scripted mock SQL engine: queries pop canned responses from a
//! queue, every statement is recorded with its bindings and transaction
//! attribution, and commit/rollback calls are counted. Import via
//! `mod common;` from any test's main file.

#![allow(dead_code)]

use async_trait::async_trait;
use docstore_core::{
    EngineError, EngineResult, IdGenerator, Params, Row, SqlEngine, SqlTransaction, Statement,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

// ============================================================================
// Deterministic ids
// ============================================================================

/// Id generator producing "id-1", "id-2", ...
#[derive(Default)]
pub struct SeqIds {
    counter: AtomicUsize,
}

impl IdGenerator for SeqIds {
    fn generate(&self) -> String {
        format!("id-{}", self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

// ============================================================================
// Row helpers
// ============================================================================

/// Build a raw storage row for a record
pub fn record_row(id: &str, record_type: &str, content: Value) -> Row {
    Row::new()
        .col("id", json!(id))
        .col("type", json!(record_type))
        .col("createdat", json!("2024-03-01T10:30:00Z"))
        .col("content", content)
}

/// Attach the windowed full-count column to a row
pub fn counted(row: Row, total: u64) -> Row {
    row.col("xxx_full_count", json!(total))
}

// ============================================================================
// MockEngine - scripted SQL engine collaborator
// ============================================================================

/// One recorded statement execution
#[derive(Debug, Clone)]
pub struct Executed {
    pub sql: String,
    pub params: Params,
    /// `Some(n)` when issued through the n-th transaction handle (1-based)
    pub via_tx: Option<usize>,
}

#[derive(Default)]
struct MockState {
    query_responses: Mutex<VecDeque<EngineResult<Vec<Row>>>>,
    execute_responses: Mutex<VecDeque<EngineResult<u64>>>,
    executed: Mutex<Vec<Executed>>,
    begins: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
    fail_begin: AtomicUsize,
    fail_ping: AtomicUsize,
}

impl MockState {
    fn record(&self, stmt: &Statement, via_tx: Option<usize>) {
        self.executed.lock().push(Executed {
            sql: stmt.sql.clone(),
            params: stmt.params.clone(),
            via_tx,
        });
    }

    fn next_query(&self) -> EngineResult<Vec<Row>> {
        self.query_responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn next_execute(&self) -> EngineResult<u64> {
        self.execute_responses.lock().pop_front().unwrap_or(Ok(1))
    }
}

/// Scripted engine; clones share all state
#[derive(Clone, Default)]
pub struct MockEngine {
    state: Arc<MockState>,
}

impl MockEngine {
    pub fn new() -> Self {
        init_tracing();
        Self::default()
    }

    /// Queue rows for the next row-returning statement
    pub fn push_rows(&self, rows: Vec<Row>) {
        self.state.query_responses.lock().push_back(Ok(rows));
    }

    /// Queue a failure for the next row-returning statement
    pub fn push_query_error(&self, message: &str) {
        self.state
            .query_responses
            .lock()
            .push_back(Err(EngineError::Statement(message.to_string())));
    }

    /// Queue an affected-row count for the next mutating statement
    pub fn push_affected(&self, count: u64) {
        self.state.execute_responses.lock().push_back(Ok(count));
    }

    /// Queue a failure for the next mutating statement
    pub fn push_execute_error(&self, message: &str) {
        self.state
            .execute_responses
            .lock()
            .push_back(Err(EngineError::Statement(message.to_string())));
    }

    /// Make the next `begin` fail
    pub fn fail_next_begin(&self) {
        self.state.fail_begin.fetch_add(1, Ordering::SeqCst);
    }

    /// Make the next liveness probe fail
    pub fn fail_next_ping(&self) {
        self.state.fail_ping.fetch_add(1, Ordering::SeqCst);
    }

    /// All recorded statements, in issue order
    pub fn statements(&self) -> Vec<Executed> {
        self.state.executed.lock().clone()
    }

    /// The n-th recorded statement (0-based)
    pub fn statement(&self, index: usize) -> Executed {
        self.statements()
            .get(index)
            .cloned()
            .unwrap_or_else(|| panic!("no statement at index {}", index))
    }

    pub fn begins(&self) -> usize {
        self.state.begins.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> usize {
        self.state.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.state.rollbacks.load(Ordering::SeqCst)
    }
}

/// Transaction handle issued by [`MockEngine::begin`]
pub struct MockTransaction {
    state: Arc<MockState>,
    number: usize,
}

#[async_trait]
impl SqlTransaction for MockTransaction {
    async fn query(&self, stmt: &Statement) -> EngineResult<Vec<Row>> {
        self.state.record(stmt, Some(self.number));
        self.state.next_query()
    }

    async fn execute(&self, stmt: &Statement) -> EngineResult<u64> {
        self.state.record(stmt, Some(self.number));
        self.state.next_execute()
    }

    async fn commit(self) -> EngineResult<()> {
        self.state.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self) -> EngineResult<()> {
        self.state.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl SqlEngine for MockEngine {
    type Tx = MockTransaction;

    async fn query(&self, stmt: &Statement) -> EngineResult<Vec<Row>> {
        self.state.record(stmt, None);
        self.state.next_query()
    }

    async fn execute(&self, stmt: &Statement) -> EngineResult<u64> {
        self.state.record(stmt, None);
        self.state.next_execute()
    }

    async fn begin(&self) -> EngineResult<Self::Tx> {
        if self.state.fail_begin.load(Ordering::SeqCst) > 0 {
            self.state.fail_begin.fetch_sub(1, Ordering::SeqCst);
            return Err(EngineError::Connection("begin refused".to_string()));
        }
        let number = self.state.begins.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MockTransaction {
            state: self.state.clone(),
            number,
        })
    }

    async fn ping(&self) -> EngineResult<()> {
        if self.state.fail_ping.load(Ordering::SeqCst) > 0 {
            self.state.fail_ping.fetch_sub(1, Ordering::SeqCst);
            return Err(EngineError::Connection("no route to host".to_string()));
        }
        Ok(())
    }
}

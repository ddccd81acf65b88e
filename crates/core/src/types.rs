//! Record, pagination, sorting and transaction-data types
//!
//! These are plain data carriers shared by the compiler and the store:
//! - [`Record`]: a stored document (id, type, timestamp, JSON content)
//! - [`SortSpec`] / [`SortDirection`]: insertion-ordered multi-key sort
//! - [`PageRequest`] / [`PagedRecords`]: pagination request and result
//! - [`TransactionData`]: caller-visible scratch space for one transaction
//! - [`TransactionOptions`] / [`Propagation`]: join-vs-new control

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A stored document
///
/// `id` is unique within `(workspace?, record_type)`. `content` is an opaque
/// JSON document; the store never validates its schema but always stamps
/// `content.id` on creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Server-assigned unique identifier
    pub id: String,
    /// Logical record type (maps to the `type` column)
    pub record_type: String,
    /// Creation timestamp, server-assigned
    pub created_at: DateTime<Utc>,
    /// Free-form JSON payload
    pub content: Value,
}

/// Sort direction for one sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending
    Asc,
    /// Descending
    Desc,
}

impl SortDirection {
    /// SQL keyword for this direction
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Multi-key sort specification
///
/// Key order is significant: each `(field, direction)` pair becomes one
/// ORDER BY clause, in insertion order. The field `createdAt` addresses the
/// physical timestamp column; every other field addresses a `content`
/// sub-field. An empty spec sorts by `id ASC` so pagination stays
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortSpec {
    keys: Vec<(String, SortDirection)>,
}

impl SortSpec {
    /// Empty sort spec (defaults to `id ASC` at compile time)
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an ascending sort key
    pub fn asc(mut self, field: impl Into<String>) -> Self {
        self.keys.push((field.into(), SortDirection::Asc));
        self
    }

    /// Append a descending sort key
    pub fn desc(mut self, field: impl Into<String>) -> Self {
        self.keys.push((field.into(), SortDirection::Desc));
        self
    }

    /// True when no sort keys were given
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Sort keys in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &(String, SortDirection)> {
        self.keys.iter()
    }
}

/// Page request: 1-based page number and page size
///
/// `page == 0` is tolerated and treated as the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u32,
    /// Rows per page; 0 means unlimited
    pub page_size: u32,
}

impl PageRequest {
    /// Build a page request
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Row offset: `max(0, page * page_size - page_size)`
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Row limit, or `None` when the page size is 0 (unlimited)
    pub fn limit(&self) -> Option<u64> {
        if self.page_size > 0 {
            Some(u64::from(self.page_size))
        } else {
            None
        }
    }
}

/// Page metadata echoed back with paginated results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// The requested page number
    pub current_page: u32,
    /// The requested page size
    pub page_size: u32,
}

/// One page of records plus the full match count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedRecords {
    /// Total rows matching the filter, independent of the page size
    pub total_count: u64,
    /// Records on this page
    pub entries: Vec<Record>,
    /// Echo of the page request
    pub page_info: PageInfo,
}

impl PagedRecords {
    /// An empty page with zero count, used by the degrade-to-empty read path
    pub fn empty(page: PageRequest) -> Self {
        PagedRecords {
            total_count: 0,
            entries: Vec::new(),
            page_info: PageInfo {
                current_page: page.page,
                page_size: page.page_size,
            },
        }
    }
}

/// Caller-visible handle for one transaction
///
/// Created when a transaction scope starts, handed to lifecycle listeners,
/// and dropped when the scope settles. The `data` map is scratch space owned
/// by the caller; the store never reads it.
#[derive(Debug)]
pub struct TransactionData {
    id: String,
    data: Mutex<HashMap<String, Value>>,
}

impl TransactionData {
    /// Create transaction data with the given transaction id
    pub fn new(id: impl Into<String>) -> Self {
        TransactionData {
            id: id.into(),
            data: Mutex::new(HashMap::new()),
        }
    }

    /// Unique id of the owning transaction
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Store a scratch value
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.data.lock().insert(key.into(), value);
    }

    /// Read a scratch value
    pub fn get(&self, key: &str) -> Option<Value> {
        self.data.lock().get(key).cloned()
    }

    /// Remove a scratch value, returning it if present
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.data.lock().remove(key)
    }
}

/// Transaction propagation behavior
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Propagation {
    /// Join an ambient transaction when one exists, otherwise start one
    #[default]
    Required,
    /// Always start a fresh transaction, ignoring any ambient one
    RequiresNew,
}

/// Options accepted by `transaction()`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionOptions {
    /// Join-vs-new behavior; defaults to [`Propagation::Required`]
    pub propagation: Propagation,
}

impl TransactionOptions {
    /// Options forcing a fresh transaction
    pub fn requires_new() -> Self {
        TransactionOptions {
            propagation: Propagation::RequiresNew,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sort_spec_preserves_insertion_order() {
        let sort = SortSpec::new().desc("amount").asc("name");
        let keys: Vec<_> = sort.iter().collect();
        assert_eq!(keys[0].0, "amount");
        assert_eq!(keys[0].1, SortDirection::Desc);
        assert_eq!(keys[1].0, "name");
        assert_eq!(keys[1].1, SortDirection::Asc);
    }

    #[test]
    fn test_page_request_offset() {
        assert_eq!(PageRequest::new(2, 10).offset(), 10);
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(0, 10).offset(), 0);
        assert_eq!(PageRequest::new(5, 25).offset(), 100);
    }

    #[test]
    fn test_page_request_limit() {
        assert_eq!(PageRequest::new(1, 10).limit(), Some(10));
        assert_eq!(PageRequest::new(1, 0).limit(), None);
    }

    #[test]
    fn test_empty_page_reports_zero_count() {
        let page = PagedRecords::empty(PageRequest::new(3, 20));
        assert_eq!(page.total_count, 0);
        assert!(page.entries.is_empty());
        assert_eq!(page.page_info.current_page, 3);
        assert_eq!(page.page_info.page_size, 20);
    }

    #[test]
    fn test_transaction_data_scratch_space() {
        let data = TransactionData::new("tx-1");
        assert_eq!(data.id(), "tx-1");
        assert!(data.get("missing").is_none());

        data.set("outbox", json!({"pending": 3}));
        assert_eq!(data.get("outbox"), Some(json!({"pending": 3})));

        assert_eq!(data.remove("outbox"), Some(json!({"pending": 3})));
        assert!(data.get("outbox").is_none());
    }

    #[test]
    fn test_propagation_default_is_required() {
        assert_eq!(TransactionOptions::default().propagation, Propagation::Required);
        assert_eq!(
            TransactionOptions::requires_new().propagation,
            Propagation::RequiresNew
        );
    }

    #[test]
    fn test_sort_direction_sql() {
        assert_eq!(SortDirection::Asc.as_sql(), "ASC");
        assert_eq!(SortDirection::Desc.as_sql(), "DESC");
    }
}

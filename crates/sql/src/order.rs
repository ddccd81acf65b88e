//! ORDER BY / LIMIT / OFFSET construction
//!
//! One clause per sort key, in spec order. `createdAt` maps to the physical
//! `createdat` column; every other key addresses a `content` sub-field with
//! the jsonb `->` operator, so numeric payloads order numerically rather
//! than lexically. An empty sort spec falls back to `id ASC`, which keeps
//! pagination deterministic.

use crate::compiler::validate_field;
use docstore_core::{PageRequest, Result, SortSpec};

/// Physical column backing the `createdAt` sort key
const CREATED_AT_COLUMN: &str = "createdat";

/// Build the ORDER BY clause for a sort spec
pub fn order_by(sort: &SortSpec) -> Result<String> {
    if sort.is_empty() {
        return Ok(" order by id ASC".to_string());
    }

    let mut clauses = Vec::new();
    for (field, direction) in sort.iter() {
        if field == "createdAt" {
            clauses.push(format!("{} {}", CREATED_AT_COLUMN, direction.as_sql()));
        } else {
            validate_field(field)?;
            clauses.push(format!("content->'{}' {}", field, direction.as_sql()));
        }
    }

    Ok(format!(" order by {}", clauses.join(", ")))
}

/// Build the LIMIT/OFFSET clause for a page request
///
/// A page size of 0 means unlimited: no LIMIT is emitted, only the offset.
pub fn page_clause(page: PageRequest) -> String {
    match page.limit() {
        Some(limit) => format!(" limit {} offset {}", limit, page.offset()),
        None => format!(" offset {}", page.offset()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docstore_core::StoreError;

    #[test]
    fn test_empty_sort_defaults_to_id() {
        assert_eq!(order_by(&SortSpec::new()).unwrap(), " order by id ASC");
    }

    #[test]
    fn test_created_at_maps_to_physical_column() {
        let sort = SortSpec::new().desc("createdAt");
        assert_eq!(order_by(&sort).unwrap(), " order by createdat DESC");
    }

    #[test]
    fn test_content_field_uses_jsonb_accessor() {
        let sort = SortSpec::new().desc("amount");
        assert_eq!(order_by(&sort).unwrap(), " order by content->'amount' DESC");
    }

    #[test]
    fn test_multi_key_order_preserved() {
        let sort = SortSpec::new().desc("amount").asc("createdAt");
        assert_eq!(
            order_by(&sort).unwrap(),
            " order by content->'amount' DESC, createdat ASC"
        );
    }

    #[test]
    fn test_sort_field_validated() {
        let sort = SortSpec::new().asc("amount'; --");
        assert!(matches!(order_by(&sort), Err(StoreError::InvalidField(_))));
    }

    #[test]
    fn test_page_clause_with_limit() {
        assert_eq!(page_clause(PageRequest::new(2, 10)), " limit 10 offset 10");
        assert_eq!(page_clause(PageRequest::new(0, 10)), " limit 10 offset 0");
        assert_eq!(page_clause(PageRequest::new(1, 10)), " limit 10 offset 0");
    }

    #[test]
    fn test_page_clause_unlimited() {
        assert_eq!(page_clause(PageRequest::new(3, 0)), " offset 0");
    }
}

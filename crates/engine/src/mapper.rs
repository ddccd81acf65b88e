//! Entity mapping: raw row to Record
//!
//! A pure transform with no schema validation of `content`. Absence of a
//! row is handled upstream as `None`; this module only deals with rows that
//! exist but may be malformed, which surfaces as a mapping error.

use chrono::{DateTime, TimeZone, Utc};
use docstore_core::{Record, Result, Row, StoreError};
use serde_json::Value;

/// Map one raw row onto a [`Record`]
///
/// Expects the four logical columns `id`, `type`, `createdat`, `content`.
/// `createdat` accepts an RFC 3339 string or an epoch-millis number.
pub fn map_row(row: &Row) -> Result<Record> {
    let id = row
        .get_str("id")
        .ok_or_else(|| StoreError::Mapping("row has no id column".to_string()))?
        .to_string();
    let record_type = row
        .get_str("type")
        .ok_or_else(|| StoreError::Mapping("row has no type column".to_string()))?
        .to_string();
    let created_at = parse_created_at(row.get("createdat"))?;
    let content = row.get("content").cloned().unwrap_or(Value::Null);

    Ok(Record {
        id,
        record_type,
        created_at,
        content,
    })
}

fn parse_created_at(value: Option<&Value>) -> Result<DateTime<Utc>> {
    match value {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StoreError::Mapping(format!("bad createdat timestamp: {}", e))),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
            .ok_or_else(|| StoreError::Mapping("bad createdat millis".to_string())),
        _ => Err(StoreError::Mapping("row has no createdat column".to_string())),
    }
}

//! Statement skeletons for the store operations
//!
//! Every statement is scoped by type (and workspace when tenancy is
//! enabled) through the reserved `xxx_*` bindings. The store fills in the
//! parameter values; nothing caller-supplied is ever spliced into SQL text.

use crate::compiler::{PARAM_CONTENT, PARAM_CREATED_AT, PARAM_ID, PARAM_TYPE, PARAM_WORKSPACE};

/// Column that carries the per-row full match count in paginated selects
pub const FULL_COUNT_COLUMN: &str = "xxx_full_count";

fn scope_predicate(workspaces: bool) -> String {
    if workspaces {
        format!(
            "workspace_id = :{} and type = :{}",
            PARAM_WORKSPACE, PARAM_TYPE
        )
    } else {
        format!("type = :{}", PARAM_TYPE)
    }
}

/// Scoped base select: all columns, type/workspace predicates applied
pub fn base_select(table: &str, workspaces: bool) -> String {
    format!(
        "select * from {} where {}",
        table,
        scope_predicate(workspaces)
    )
}

/// Scoped base select carrying the windowed full match count
///
/// `count(*) over ()` makes every row report the total match count, so a
/// paginated read needs no second round trip. Zero rows simply means a
/// total of zero.
pub fn base_select_counted(table: &str, workspaces: bool) -> String {
    format!(
        "select *, count(*) over () as {} from {} where {}",
        FULL_COUNT_COLUMN,
        table,
        scope_predicate(workspaces)
    )
}

/// Exact-key select for single-entity lookups
pub fn select_by_id(table: &str, workspaces: bool) -> String {
    format!("{} and id = :{}", base_select(table, workspaces), PARAM_ID)
}

/// Insert of one record
pub fn insert(table: &str, workspaces: bool) -> String {
    if workspaces {
        format!(
            "insert into {} (id, workspace_id, type, createdat, content) \
             values (:{}, :{}, :{}, :{}, :{})",
            table, PARAM_ID, PARAM_WORKSPACE, PARAM_TYPE, PARAM_CREATED_AT, PARAM_CONTENT
        )
    } else {
        format!(
            "insert into {} (id, type, createdat, content) values (:{}, :{}, :{}, :{})",
            table, PARAM_ID, PARAM_TYPE, PARAM_CREATED_AT, PARAM_CONTENT
        )
    }
}

/// Full content replace for one record
pub fn update_content(table: &str, workspaces: bool) -> String {
    format!(
        "update {} set content = :{} where {} and id = :{}",
        table,
        PARAM_CONTENT,
        scope_predicate(workspaces),
        PARAM_ID
    )
}

/// Exact-key delete
pub fn delete_by_id(table: &str, workspaces: bool) -> String {
    format!(
        "delete from {} where {} and id = :{}",
        table,
        scope_predicate(workspaces),
        PARAM_ID
    )
}

/// Scoped delete with an appended filter conjunction
pub fn delete_where(table: &str, workspaces: bool, where_clause: &str) -> String {
    format!(
        "delete from {} where {}{}",
        table,
        scope_predicate(workspaces),
        where_clause
    )
}

/// Unconditional truncate, used only by purge
pub fn truncate(table: &str) -> String {
    format!("truncate {}", table)
}

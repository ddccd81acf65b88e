//! Store configuration

/// Configuration surface for a document store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Enable tenant scoping: every statement gains a `workspace_id`
    /// predicate and every operation requires a workspace id
    pub workspaces: bool,
    /// Log every statement and its bindings at debug level
    pub log_sql: bool,
    /// Primary storage table
    pub table: String,
    /// Backup table, touched only by `purge`
    pub backup_table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            workspaces: false,
            log_sql: false,
            table: "datastore".to_string(),
            backup_table: "backupdatastore".to_string(),
        }
    }
}

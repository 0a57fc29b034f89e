//! The database client boundary the manager consumes.
//!
//! This crate never talks to a socket itself — `DatabaseClient` is the
//! seam an application wires up to its own connection. Tests supply an
//! in-memory fake; production code wires up the real network client,
//! which is out of scope for this crate.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::MigrateResult;

/// One query result row, keyed by column/field name.
pub type Record = HashMap<String, Value>;

/// `INFO FOR DB` response: definition-language strings keyed by entity
/// name, grouped by the collection the database groups them into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbInfo {
    pub tables: HashMap<String, String>,
    pub functions: HashMap<String, String>,
    pub accesses: HashMap<String, String>,
    pub analyzers: HashMap<String, String>,
    pub params: HashMap<String, String>,
    pub sequences: HashMap<String, String>,
    pub users: HashMap<String, String>,
}

/// `INFO FOR TABLE <t>` response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableInfo {
    pub fields: HashMap<String, String>,
    pub indexes: HashMap<String, String>,
    pub events: HashMap<String, String>,
}

/// The minimal database interface the migration manager depends on.
///
/// `connect`/`disconnect` are idempotent lifecycle calls. `execute_query`
/// runs one or more `;`-separated definition-language statements as a
/// single batch; the manager relies on the database wrapping that batch
/// atomically.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    async fn connect(&self) -> MigrateResult<()>;
    async fn disconnect(&self) -> MigrateResult<()>;

    /// Execute one or more `;`-separated statements as a batch.
    async fn execute_query(&self, statements: &str) -> MigrateResult<()>;

    /// `INFO FOR DB`.
    async fn info_for_db(&self) -> MigrateResult<DbInfo>;

    /// `INFO FOR TABLE <name>`.
    async fn info_for_table(&self, name: &str) -> MigrateResult<TableInfo>;

    /// Convenience select-all against a table.
    async fn select(&self, table: &str) -> MigrateResult<Vec<Record>>;

    /// Convenience insert, returning the record including its
    /// database-assigned id.
    async fn create(&self, table: &str, record: Record) -> MigrateResult<Record>;

    /// Convenience delete by record id (e.g. `_migrations:abc123`).
    async fn delete(&self, record_id: &str) -> MigrateResult<()>;
}

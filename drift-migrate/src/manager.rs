//! The migration manager: lifecycle orchestration over a
//! [`DatabaseClient`] — connect, ensure history table, diff, apply,
//! record, rollback with integrity verification, status.
//!
//! Every operation reintrospects before acting
//! — there is no cache between calls. This is a deliberate
//! correctness-over-speed choice: stale introspection is exactly what the
//! spec forbids.

use tracing::{debug, info, warn};

use drift_schema::{MigrationRecord, Schema};

use crate::checksum::{checksum, verify_checksum};
use crate::client::DatabaseClient;
use crate::diff::{diff_schema, has_changes, DiffResult};
use crate::error::{MigrateError, MigrateResult};
use crate::history::HistoryStore;
use crate::parse::{parse_introspection, HISTORY_TABLE};
use crate::source::SchemaSource;

/// The manager's lifecycle state.
///
/// `new` → `initialized` → `applying`/`rolling-back` → `initialized` or
/// `failed`. `failed` is terminal unless the caller re-initializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    New,
    Initialized,
    Applying,
    RollingBack,
    Failed,
}

/// Configuration for a [`MigrationManager`], built with the same
/// `XxxConfig::new().foo(...)` fluent style used throughout this crate,
/// restricted to the knobs this crate is actually in scope for (the
/// CLI/config loader owns everything else).
#[derive(Debug, Clone)]
pub struct MigrationManagerConfig {
    /// Name of the in-database history table. Defaults to `_migrations`.
    pub history_table: String,
    /// Prefix used for this manager's `tracing` spans, for applications
    /// running more than one manager concurrently against different
    /// databases.
    pub span_prefix: String,
}

impl Default for MigrationManagerConfig {
    fn default() -> Self {
        Self {
            history_table: HISTORY_TABLE.to_string(),
            span_prefix: "drift_migrate".to_string(),
        }
    }
}

impl MigrationManagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history_table(mut self, name: impl Into<String>) -> Self {
        self.history_table = name.into();
        self
    }

    pub fn span_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.span_prefix = prefix.into();
        self
    }
}

/// Result of [`MigrationManager::status`]: one entry per applied
/// migration, oldest first.
#[derive(Debug, Clone)]
pub struct MigrationStatusEntry {
    pub applied: bool,
    pub migration: MigrationRecord,
}

/// Lifecycle orchestrator over a [`DatabaseClient`] and [`HistoryStore`].
/// One instance owns one client; concurrent migrators against the
/// same database are undefined behavior by design.
pub struct MigrationManager<C, H> {
    client: C,
    history: H,
    config: MigrationManagerConfig,
    state: ManagerState,
}

impl<C: DatabaseClient, H: HistoryStore> MigrationManager<C, H> {
    pub fn new(client: C, history: H, config: MigrationManagerConfig) -> Self {
        Self {
            client,
            history,
            config,
            state: ManagerState::New,
        }
    }

    pub fn state(&self) -> ManagerState {
        self.state
    }

    /// Connect the client (idempotent) and ensure the history table
    /// exists, probing with a trivial query before creating it.
    pub async fn initialize(&mut self) -> MigrateResult<()> {
        self.client.connect().await?;

        if self.client.select(&self.config.history_table).await.is_err() {
            debug!(table = %self.config.history_table, "history table missing, creating");
            self.history.ensure_initialized().await?;
        }

        self.state = ManagerState::Initialized;
        info!("migration manager initialized");
        Ok(())
    }

    /// Introspect the live database and reconstruct a [`Schema`], logging
    /// and skipping any entity whose definition string fails to parse.
    async fn introspect(&self) -> MigrateResult<Schema> {
        let db_info = self.client.info_for_db().await?;

        let mut table_infos = std::collections::HashMap::new();
        for name in db_info.tables.keys() {
            if name == &self.config.history_table {
                continue;
            }
            // Sequential, per table.
            let info = self.client.info_for_table(name).await?;
            table_infos.insert(name.clone(), info);
        }

        let result = parse_introspection(&db_info, &table_infos);
        for warning in &result.warnings {
            warn!(%warning, "introspection skipped an entity");
        }
        Ok(result.schema)
    }

    /// `hasChanges(desired) → bool`: introspect, run the
    /// fast-path diff, return.
    pub async fn has_changes(&self, desired: &Schema) -> MigrateResult<bool> {
        let current = self.introspect().await?;
        Ok(has_changes(desired, &current))
    }

    /// `generateDiff(desired) → {up, down}`: introspect and run
    /// the full diff. Read-only with respect to the database.
    pub async fn generate_diff(&self, desired: &Schema) -> MigrateResult<DiffResult> {
        let current = self.introspect().await?;
        Ok(diff_schema(desired, &current))
    }

    /// Apply a migration. With `up`/`down` supplied, they are used
    /// verbatim (manual override). Otherwise the manager introspects and
    /// generates a diff, failing with [`MigrateError::NoChanges`] if
    /// nothing differs.
    pub async fn migrate(
        &mut self,
        desired: &Schema,
        manual: Option<(String, String)>,
    ) -> MigrateResult<MigrationRecord> {
        self.state = ManagerState::Applying;

        let (up, down) = match manual {
            Some(pair) => pair,
            None => {
                let current = self.introspect().await?;
                if !has_changes(desired, &current) {
                    self.state = ManagerState::Initialized;
                    return Err(MigrateError::NoChanges);
                }
                let diff = diff_schema(desired, &current);
                (diff.up, diff.down)
            }
        };

        let mut record = MigrationRecord::new(up.clone(), down.clone());
        record.checksum = checksum(&up);
        record.down_checksum = checksum(&down);

        if let Err(e) = self.client.execute_query(&up).await {
            self.state = ManagerState::Failed;
            return Err(MigrateError::migration_execution(e.to_string()));
        }

        let inserted = match self.history.record(&record).await {
            Ok(r) => r,
            Err(e) => {
                // Database inconsistency tolerated here: `up` ran
                // but the record failed to persist. Caller can
                // re-introspect and regenerate.
                self.state = ManagerState::Failed;
                return Err(e);
            }
        };

        self.state = ManagerState::Initialized;
        info!(id = ?inserted.id, "migration applied");
        Ok(inserted)
    }

    /// Roll back the migration identified by `migration_id`, or the most
    /// recently applied one if `None`. Integrity is verified
    /// before `down` is executed; this is the one form of recovery the
    /// design affords.
    pub async fn rollback(&mut self, migration_id: Option<&str>) -> MigrateResult<()> {
        self.state = ManagerState::RollingBack;

        let records = self.history.load().await?;
        if records.is_empty() {
            self.state = ManagerState::Initialized;
            return Err(MigrateError::NothingToRollback);
        }

        let target = match migration_id {
            Some(id) => records.iter().find(|r| r.id.as_deref() == Some(id)),
            None => records.last(),
        };
        let Some(record) = target else {
            self.state = ManagerState::Initialized;
            return Err(MigrateError::NothingToRollback);
        };

        let id = record.id.clone().unwrap_or_default();

        let up_actual = checksum(&record.up);
        if up_actual != record.checksum {
            self.state = ManagerState::Failed;
            return Err(MigrateError::IntegrityViolation {
                id,
                expected: record.checksum.clone(),
                actual: up_actual,
            });
        }
        let down_actual = checksum(&record.down);
        if down_actual != record.down_checksum {
            self.state = ManagerState::Failed;
            return Err(MigrateError::IntegrityViolation {
                id,
                expected: record.down_checksum.clone(),
                actual: down_actual,
            });
        }

        if record.down.trim().is_empty() {
            self.state = ManagerState::Initialized;
            return Err(MigrateError::EmptyRollback(id));
        }

        if let Err(e) = self.client.execute_query(&record.down).await {
            self.state = ManagerState::Failed;
            return Err(MigrateError::RollbackExecutionFailed {
                id,
                source: Box::new(MigrateError::migration_execution(e.to_string())),
            });
        }

        self.history.delete(&id).await?;
        self.state = ManagerState::Initialized;
        info!(%id, "migration rolled back");
        Ok(())
    }

    /// `status() → [{applied: true, migration}]`: every applied
    /// migration, ascending by `applied_at`.
    pub async fn status(&self) -> MigrateResult<Vec<MigrationStatusEntry>> {
        let records = self.history.load().await?;
        Ok(records
            .into_iter()
            .map(|migration| MigrationStatusEntry {
                applied: true,
                migration,
            })
            .collect())
    }

    /// Convenience wrapper over `has_changes`, negated.
    pub async fn is_up_to_date(&self, desired: &Schema) -> MigrateResult<bool> {
        Ok(!self.has_changes(desired).await?)
    }

    /// Load the desired schema through a [`SchemaSource`] collaborator,
    /// then apply it exactly as [`MigrationManager::migrate`] would. The
    /// loader's errors (`SchemaLoadError`) surface unchanged.
    pub async fn migrate_from_source(
        &mut self,
        source: &dyn SchemaSource,
    ) -> MigrateResult<MigrationRecord> {
        let desired = source.load().await?;
        self.migrate(&desired, None).await
    }

    /// Disconnect the client. Idempotent.
    pub async fn close(&mut self) -> MigrateResult<()> {
        self.client.disconnect().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::Value;

    use crate::client::{DbInfo, Record, TableInfo};
    use crate::history::ClientHistoryStore;

    #[derive(Default)]
    struct FakeClient {
        connected: Mutex<bool>,
        db_info: Mutex<DbInfo>,
        table_infos: Mutex<HashMap<String, TableInfo>>,
        history_rows: Mutex<Vec<Record>>,
        next_id: Mutex<u64>,
        history_table_exists: Mutex<bool>,
        fail_execute: Mutex<bool>,
    }

    #[async_trait]
    impl DatabaseClient for FakeClient {
        async fn connect(&self) -> MigrateResult<()> {
            *self.connected.lock().unwrap() = true;
            Ok(())
        }
        async fn disconnect(&self) -> MigrateResult<()> {
            *self.connected.lock().unwrap() = false;
            Ok(())
        }
        async fn execute_query(&self, _statements: &str) -> MigrateResult<()> {
            if *self.fail_execute.lock().unwrap() {
                return Err(MigrateError::connection("simulated failure"));
            }
            Ok(())
        }
        async fn info_for_db(&self) -> MigrateResult<DbInfo> {
            Ok(self.db_info.lock().unwrap().clone())
        }
        async fn info_for_table(&self, name: &str) -> MigrateResult<TableInfo> {
            Ok(self.table_infos.lock().unwrap().get(name).cloned().unwrap_or_default())
        }
        async fn select(&self, table: &str) -> MigrateResult<Vec<Record>> {
            if table == HISTORY_TABLE {
                if !*self.history_table_exists.lock().unwrap() {
                    return Err(MigrateError::connection("no such table"));
                }
                return Ok(self.history_rows.lock().unwrap().clone());
            }
            Ok(Vec::new())
        }
        async fn create(&self, table: &str, mut record: Record) -> MigrateResult<Record> {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            record.insert("id".into(), Value::String(format!("{table}:{next_id}")));
            if table == HISTORY_TABLE {
                *self.history_table_exists.lock().unwrap() = true;
                self.history_rows.lock().unwrap().push(record.clone());
            }
            Ok(record)
        }
        async fn delete(&self, record_id: &str) -> MigrateResult<()> {
            self.history_rows
                .lock()
                .unwrap()
                .retain(|r| r.get("id").and_then(Value::as_str) != Some(record_id));
            Ok(())
        }
    }

    fn manager_with_client(
        client: std::sync::Arc<FakeClient>,
    ) -> MigrationManager<std::sync::Arc<FakeClient>, ClientHistoryStore<std::sync::Arc<FakeClient>>> {
        let history = ClientHistoryStore::new(client.clone());
        MigrationManager::new(client, history, MigrationManagerConfig::new())
    }

    #[async_trait]
    impl DatabaseClient for std::sync::Arc<FakeClient> {
        async fn connect(&self) -> MigrateResult<()> {
            (**self).connect().await
        }
        async fn disconnect(&self) -> MigrateResult<()> {
            (**self).disconnect().await
        }
        async fn execute_query(&self, statements: &str) -> MigrateResult<()> {
            (**self).execute_query(statements).await
        }
        async fn info_for_db(&self) -> MigrateResult<DbInfo> {
            (**self).info_for_db().await
        }
        async fn info_for_table(&self, name: &str) -> MigrateResult<TableInfo> {
            (**self).info_for_table(name).await
        }
        async fn select(&self, table: &str) -> MigrateResult<Vec<Record>> {
            (**self).select(table).await
        }
        async fn create(&self, table: &str, record: Record) -> MigrateResult<Record> {
            (**self).create(table, record).await
        }
        async fn delete(&self, record_id: &str) -> MigrateResult<()> {
            (**self).delete(record_id).await
        }
    }

    use drift_schema::{Field, Schema as DSchema, Table};

    #[tokio::test]
    async fn initialize_creates_history_table_when_absent() {
        let client = std::sync::Arc::new(FakeClient::default());
        let mut mgr = manager_with_client(client.clone());
        mgr.initialize().await.unwrap();
        assert_eq!(mgr.state(), ManagerState::Initialized);
        assert!(*client.history_table_exists.lock().unwrap());
    }

    #[tokio::test]
    async fn migrate_fails_with_no_changes_when_schemas_match() {
        let client = std::sync::Arc::new(FakeClient::default());
        let mut mgr = manager_with_client(client);
        mgr.initialize().await.unwrap();
        let desired = DSchema::new();
        let err = mgr.migrate(&desired, None).await.unwrap_err();
        assert!(matches!(err, MigrateError::NoChanges));
        assert_eq!(mgr.state(), ManagerState::Initialized);
    }

    #[tokio::test]
    async fn migrate_applies_and_records_history() {
        let client = std::sync::Arc::new(FakeClient::default());
        let mut mgr = manager_with_client(client);
        mgr.initialize().await.unwrap();

        let desired = DSchema::new().table(Table::new("user").field(Field::new("email", "string")));
        let record = mgr.migrate(&desired, None).await.unwrap();
        assert!(record.id.is_some());
        assert!(record.up.contains("DEFINE TABLE user"));

        let status = mgr.status().await.unwrap();
        assert_eq!(status.len(), 1);
        assert!(status[0].applied);
    }

    #[tokio::test]
    async fn rollback_with_no_history_fails() {
        let client = std::sync::Arc::new(FakeClient::default());
        let mut mgr = manager_with_client(client);
        mgr.initialize().await.unwrap();
        let err = mgr.rollback(None).await.unwrap_err();
        assert!(matches!(err, MigrateError::NothingToRollback));
    }

    #[tokio::test]
    async fn rollback_detects_tampered_checksum() {
        let client = std::sync::Arc::new(FakeClient::default());
        let mut mgr = manager_with_client(client.clone());
        mgr.initialize().await.unwrap();

        let desired = DSchema::new().table(Table::new("user").field(Field::new("email", "string")));
        mgr.migrate(&desired, None).await.unwrap();

        // Tamper with the stored `up` directly through the fake client's
        // backing rows, simulating on-disk corruption.
        {
            let mut rows = client.history_rows.lock().unwrap();
            let row = &mut rows[0];
            row.insert("up".into(), Value::String("DEFINE TABLE tampered SCHEMAFULL;".into()));
        }

        let err = mgr.rollback(None).await.unwrap_err();
        assert!(matches!(err, MigrateError::IntegrityViolation { .. }));
    }

    #[tokio::test]
    async fn rollback_succeeds_and_deletes_record() {
        let client = std::sync::Arc::new(FakeClient::default());
        let mut mgr = manager_with_client(client);
        mgr.initialize().await.unwrap();

        let desired = DSchema::new().table(Table::new("user").field(Field::new("email", "string")));
        mgr.migrate(&desired, None).await.unwrap();

        mgr.rollback(None).await.unwrap();
        let status = mgr.status().await.unwrap();
        assert!(status.is_empty());
    }

    #[tokio::test]
    async fn manual_up_down_override_is_used_verbatim() {
        let client = std::sync::Arc::new(FakeClient::default());
        let mut mgr = manager_with_client(client);
        mgr.initialize().await.unwrap();

        let desired = DSchema::new();
        let record = mgr
            .migrate(&desired, Some(("DEFINE TABLE manual SCHEMAFULL;".into(), "REMOVE TABLE manual;".into())))
            .await
            .unwrap();
        assert_eq!(record.up, "DEFINE TABLE manual SCHEMAFULL;");
    }

    #[tokio::test]
    async fn migrate_from_source_loads_and_applies() {
        use crate::source::StaticSchemaSource;

        let client = std::sync::Arc::new(FakeClient::default());
        let mut mgr = manager_with_client(client);
        mgr.initialize().await.unwrap();

        let desired = DSchema::new().table(Table::new("user").field(Field::new("email", "string")));
        let source = StaticSchemaSource::new(desired);
        let record = mgr.migrate_from_source(&source).await.unwrap();
        assert!(record.up.contains("DEFINE TABLE user"));
    }
}

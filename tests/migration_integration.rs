//! End-to-end integration tests for the `drift` facade: author a desired
//! schema, drive it through a fake `DatabaseClient`, and exercise the full
//! initialize/migrate/rollback/status lifecycle.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use drift::prelude::*;
use drift::migrate::{DbInfo, Record, TableInfo};

#[derive(Default)]
struct FakeClient {
    db_info: Mutex<DbInfo>,
    table_infos: Mutex<HashMap<String, TableInfo>>,
    history_rows: Mutex<Vec<Record>>,
    next_id: Mutex<u64>,
}

#[async_trait]
impl DatabaseClient for Arc<FakeClient> {
    async fn connect(&self) -> MigrateResult<()> {
        Ok(())
    }
    async fn disconnect(&self) -> MigrateResult<()> {
        Ok(())
    }
    async fn execute_query(&self, _statements: &str) -> MigrateResult<()> {
        Ok(())
    }
    async fn info_for_db(&self) -> MigrateResult<DbInfo> {
        Ok(self.db_info.lock().unwrap().clone())
    }
    async fn info_for_table(&self, name: &str) -> MigrateResult<TableInfo> {
        Ok(self.table_infos.lock().unwrap().get(name).cloned().unwrap_or_default())
    }
    async fn select(&self, table: &str) -> MigrateResult<Vec<Record>> {
        if table == "_migrations" {
            Ok(self.history_rows.lock().unwrap().clone())
        } else {
            Ok(Vec::new())
        }
    }
    async fn create(&self, table: &str, mut record: Record) -> MigrateResult<Record> {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        record.insert("id".into(), Value::String(format!("{table}:{next_id}")));
        if table == "_migrations" {
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

fn desired_user_schema() -> Schema {
    Schema::new().table(
        Table::new("user")
            .field(Field::new("email", "string").assert("$value != NONE"))
            .field(Field::new("createdAt", "datetime").default_value("time::now()"))
            .index(Index::new("email", vec!["email".into()]).unique(true)),
    )
}

#[tokio::test]
async fn full_lifecycle_create_then_rollback() {
    let client = Arc::new(FakeClient::default());
    let history = ClientHistoryStore::new(client.clone());
    let mut manager = MigrationManager::new(client, history, MigrationManagerConfig::new());

    manager.initialize().await.unwrap();
    assert_eq!(manager.state(), ManagerState::Initialized);

    let desired = desired_user_schema();
    assert!(manager.has_changes(&desired).await.unwrap());

    let record = manager.migrate(&desired, None).await.unwrap();
    assert!(record.up.contains("DEFINE TABLE user SCHEMAFULL;"));
    assert!(record.up.contains("DEFINE INDEX email ON TABLE user FIELDS email UNIQUE;"));
    assert!(record.down.contains("REMOVE TABLE user;"));

    let status = manager.status().await.unwrap();
    assert_eq!(status.len(), 1);
    assert!(status[0].applied);

    manager.rollback(None).await.unwrap();
    let status = manager.status().await.unwrap();
    assert!(status.is_empty());
}

#[tokio::test]
async fn migrate_is_refused_when_nothing_changed() {
    let client = Arc::new(FakeClient::default());
    let history = ClientHistoryStore::new(client.clone());
    let mut manager = MigrationManager::new(client, history, MigrationManagerConfig::new());
    manager.initialize().await.unwrap();

    let empty = Schema::new();
    let err = manager.migrate(&empty, None).await.unwrap_err();
    assert!(matches!(err, MigrateError::NoChanges));
}

#[tokio::test]
async fn checksum_round_trips_through_verify() {
    let up = "DEFINE TABLE user SCHEMAFULL;";
    let stored = checksum(up);
    assert!(stored.starts_with("sha256."));
    assert!(verify_checksum(up, &stored));
    assert!(!verify_checksum("DEFINE TABLE user SCHEMALESS;", &stored));
}

//! Migration history storage: records applied migrations through
//! the same [`DatabaseClient`] seam the rest of the crate uses — no
//! direct SQL, no dedicated wire protocol.

use async_trait::async_trait;
use serde_json::Value;

use drift_schema::MigrationRecord;

use crate::client::{DatabaseClient, Record};
use crate::error::{MigrateError, MigrateResult};
use crate::parse::HISTORY_TABLE;

/// Storage for the applied-migration log, keyed on the richer
/// forward+rollback [`MigrationRecord`](drift_schema::MigrationRecord)
/// shape this crate persists.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Create the `_migrations` table if it does not already exist.
    async fn ensure_initialized(&self) -> MigrateResult<()>;

    /// Load every applied migration, sorted ascending by `applied_at`.
    async fn load(&self) -> MigrateResult<Vec<MigrationRecord>>;

    /// Insert a new record; the returned record carries the
    /// database-assigned id.
    async fn record(&self, record: &MigrationRecord) -> MigrateResult<MigrationRecord>;

    /// Delete a record by its database-assigned id, after a successful
    /// rollback.
    async fn delete(&self, id: &str) -> MigrateResult<()>;
}

/// A [`HistoryStore`] backed by any [`DatabaseClient`].
pub struct ClientHistoryStore<C> {
    client: C,
}

impl<C: DatabaseClient> ClientHistoryStore<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: DatabaseClient> HistoryStore for ClientHistoryStore<C> {
    async fn ensure_initialized(&self) -> MigrateResult<()> {
        let ddl = format!(
            "DEFINE TABLE {table} SCHEMAFULL;\n\
             DEFINE FIELD appliedAt ON TABLE {table} TYPE datetime;\n\
             DEFINE FIELD up ON TABLE {table} TYPE string;\n\
             DEFINE FIELD down ON TABLE {table} TYPE string;\n\
             DEFINE FIELD checksum ON TABLE {table} TYPE string;\n\
             DEFINE FIELD downChecksum ON TABLE {table} TYPE string;",
            table = HISTORY_TABLE
        );
        self.client.execute_query(&ddl).await
    }

    async fn load(&self) -> MigrateResult<Vec<MigrationRecord>> {
        let rows = self.client.select(HISTORY_TABLE).await?;
        let mut records = rows
            .into_iter()
            .map(record_from_row)
            .collect::<MigrateResult<Vec<_>>>()?;
        records.sort_by_key(|r| r.applied_at);
        Ok(records)
    }

    async fn record(&self, record: &MigrationRecord) -> MigrateResult<MigrationRecord> {
        let row = row_from_record(record)?;
        let created = self.client.create(HISTORY_TABLE, row).await?;
        record_from_row(created)
    }

    async fn delete(&self, id: &str) -> MigrateResult<()> {
        self.client.delete(id).await
    }
}

fn row_from_record(record: &MigrationRecord) -> MigrateResult<Record> {
    let value = serde_json::to_value(record)
        .map_err(|e| MigrateError::migration_execution(format!("failed to encode migration record: {e}")))?;
    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        _ => Err(MigrateError::migration_execution("migration record did not encode as an object")),
    }
}

fn record_from_row(row: Record) -> MigrateResult<MigrationRecord> {
    let value = Value::Object(row.into_iter().collect());
    serde_json::from_value(value)
        .map_err(|e| MigrateError::migration_execution(format!("failed to decode migration record: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::client::{DbInfo, TableInfo};

    #[derive(Default)]
    struct FakeClient {
        rows: Mutex<Vec<Record>>,
        next_id: Mutex<u64>,
    }

    #[async_trait]
    impl DatabaseClient for FakeClient {
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
            Ok(DbInfo::default())
        }
        async fn info_for_table(&self, _name: &str) -> MigrateResult<TableInfo> {
            Ok(TableInfo::default())
        }
        async fn select(&self, _table: &str) -> MigrateResult<Vec<Record>> {
            Ok(self.rows.lock().unwrap().clone())
        }
        async fn create(&self, table: &str, mut record: Record) -> MigrateResult<Record> {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            let id = format!("{table}:{next_id}");
            record.insert("id".to_string(), Value::String(id));
            self.rows.lock().unwrap().push(record.clone());
            Ok(record)
        }
        async fn delete(&self, record_id: &str) -> MigrateResult<()> {
            self.rows
                .lock()
                .unwrap()
                .retain(|r| r.get("id").and_then(Value::as_str) != Some(record_id));
            Ok(())
        }
    }

    fn sample_record(up: &str) -> MigrationRecord {
        let mut record = MigrationRecord::new(up, format!("undo {up}"));
        record.checksum = crate::checksum::checksum(&record.up);
        record.down_checksum = crate::checksum::checksum(&record.down);
        record
    }

    #[tokio::test]
    async fn record_round_trips_through_the_client() {
        let store = ClientHistoryStore::new(FakeClient::default());
        let inserted = store.record(&sample_record("DEFINE TABLE user SCHEMAFULL;")).await.unwrap();
        assert!(inserted.id.is_some());

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].checksum, inserted.checksum);
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let store = ClientHistoryStore::new(FakeClient::default());
        let inserted = store.record(&sample_record("DEFINE TABLE user SCHEMAFULL;")).await.unwrap();
        store.delete(inserted.id.as_deref().unwrap()).await.unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn load_sorts_by_applied_at_ascending() {
        let store = ClientHistoryStore::new(FakeClient::default());
        let mut first = sample_record("A");
        first.applied_at = chrono::Utc::now() - chrono::Duration::seconds(60);
        let mut second = sample_record("B");
        second.applied_at = chrono::Utc::now();

        store.record(&second).await.unwrap();
        store.record(&first).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded[0].up, "A");
        assert_eq!(loaded[1].up, "B");
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One applied migration, as persisted in the `_migrations` history table.
///
/// `id` is assigned by the database on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    pub id: Option<String>,
    #[serde(rename = "appliedAt")]
    pub applied_at: DateTime<Utc>,
    pub up: String,
    pub down: String,
    pub checksum: String,
    #[serde(rename = "downChecksum")]
    pub down_checksum: String,
}

impl MigrationRecord {
    pub fn new(up: impl Into<String>, down: impl Into<String>) -> Self {
        Self {
            id: None,
            applied_at: Utc::now(),
            up: up.into(),
            down: down.into(),
            checksum: String::new(),
            down_checksum: String::new(),
        }
    }
}

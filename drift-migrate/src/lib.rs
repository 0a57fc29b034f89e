//! # drift-migrate
//!
//! Introspection, diffing, and migration engine for `drift`.
//!
//! This crate contains everything outside the plain data model (which
//! lives in `drift-schema`): the checksum utility, the
//! definition-language generators, the introspection parser, the semantic
//! normalizer, the diff engine, the migration manager, and the in-database
//! history store.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐     ┌──────────────────┐     ┌───────────────┐
//! │ DatabaseClient │────▶│ parse (introspect)│────▶│ Schema (cur.) │
//! └────────────────┘     └──────────────────┘     └───────┬───────┘
//!                                                          │
//! ┌────────────────┐                                      ▼
//! │ Schema (desired)│───────────────────────────▶┌──────────────┐
//! └────────────────┘                              │ diff engine  │
//!                                                  └──────┬───────┘
//!                                                         ▼
//!                                              ┌─────────────────────┐
//!                                              │ {up, down, changes} │
//!                                              └──────────┬──────────┘
//!                                                         ▼
//!                                              ┌─────────────────────┐
//!                                              │ MigrationManager    │
//!                                              │  execute + record   │
//!                                              └──────────┬──────────┘
//!                                                         ▼
//!                                              ┌─────────────────────┐
//!                                              │ HistoryStore        │
//!                                              └─────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use drift_migrate::{MigrationManager, MigrationManagerConfig, ClientHistoryStore};
//! use drift_schema::{Schema, Table, Field};
//!
//! async fn run(client: impl drift_migrate::DatabaseClient + Clone) -> drift_migrate::MigrateResult<()> {
//!     let desired = Schema::new().table(Table::new("user").field(Field::new("email", "string")));
//!
//!     let history = ClientHistoryStore::new(client.clone());
//!     let mut manager = MigrationManager::new(client, history, MigrationManagerConfig::new());
//!     manager.initialize().await?;
//!
//!     if manager.has_changes(&desired).await? {
//!         let record = manager.migrate(&desired, None).await?;
//!         println!("applied migration {:?}", record.id);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod client;
pub mod diff;
pub mod error;
pub mod generate;
pub mod history;
pub mod manager;
pub mod normalize;
pub mod parse;
pub mod source;

pub use checksum::{checksum, verify_checksum};
pub use client::{DatabaseClient, DbInfo, Record, TableInfo};
pub use diff::{diff_schema, has_changes, DiffResult};
pub use error::{MigrateError, MigrateResult};
pub use history::{ClientHistoryStore, HistoryStore};
pub use manager::{ManagerState, MigrationManager, MigrationManagerConfig, MigrationStatusEntry};
pub use parse::{parse_introspection, IntrospectionResult, HISTORY_TABLE};
pub use source::{SchemaSource, StaticSchemaSource};

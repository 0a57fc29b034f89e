//! # drift
//!
//! A declarative schema migration engine for multi-model graph/document
//! databases.
//!
//! `drift` compares a **desired schema** — authored as Rust values — against
//! the **actual schema** discovered by live introspection, and emits a
//! minimal, bidirectional migration script (forward + rollback) in the
//! database's own definition language. Migrations are applied transactionally
//! and recorded with content-addressed checksums in an in-database history
//! table.
//!
//! This crate is a thin facade: [`drift-schema`](drift_schema) holds the data
//! model, [`drift-migrate`](drift_migrate) holds the introspection parser,
//! semantic normalizer, diff engine, definition-language generators, and the
//! migration manager.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use drift::prelude::*;
//!
//! async fn run(client: impl DatabaseClient + Clone) -> MigrateResult<()> {
//!     let desired = Schema::new().table(
//!         Table::new("user")
//!             .field(Field::new("email", "string").assert("$value != NONE"))
//!             .index(Index::new("email", vec!["email".into()]).unique(true)),
//!     );
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

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

/// Schema data model: tables, relations, fields, indexes, events,
/// functions, analyzers, scopes, params, sequences, users.
pub mod schema {
    pub use drift_schema::*;
}

/// Introspection, diffing, and migration lifecycle.
pub mod migrate {
    pub use drift_migrate::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::schema::{
        Analyzer, Change, EntityKind, Event, Field, Function, Index, MigrationRecord, Operation,
        Param, Parameter, Relation, Schema, Scope, Sequence, Table, TableRef, User,
    };
    pub use crate::migrate::{
        checksum, verify_checksum, ClientHistoryStore, DatabaseClient, DiffResult, HistoryStore,
        ManagerState, MigrateError, MigrateResult, MigrationManager, MigrationManagerConfig,
        MigrationStatusEntry, SchemaSource, StaticSchemaSource,
    };
}

// Re-export the most commonly used types at the crate root.
pub use schema::Schema;
pub use migrate::{MigrateError, MigrateResult, MigrationManager};

//! Data model for the drift schema migration engine.
//!
//! A [`Schema`] is a value object holding one collection per entity-kind:
//! tables, relations, functions, analyzers, access scopes, params,
//! sequences, and users. It is produced two ways — authored directly as
//! Rust values (the *desired* schema) or reconstructed by introspection
//! (the *current* schema) — and the two are compared structurally by
//! `drift-migrate`'s diff engine.
//!
//! Every type here is plain data: no parsing, no I/O, no database
//! awareness. That lives in `drift-migrate`.

mod analyzer;
mod change;
mod event;
mod field;
mod function;
mod history;
mod index;
mod param;
mod relation;
mod schema;
mod scope;
mod sequence;
mod table;
mod user;

pub use analyzer::Analyzer;
pub use change::{Change, EntityKind, Operation};
pub use event::Event;
pub use field::{Field, PreviousName};
pub use function::{Function, Parameter};
pub use history::MigrationRecord;
pub use index::{Bm25Params, Distance, Index, IndexType};
pub use param::Param;
pub use relation::{Relation, TableRef};
pub use schema::Schema;
pub use scope::Scope;
pub use sequence::Sequence;
pub use table::Table;
pub use user::{User, UserLevel, UserRole};

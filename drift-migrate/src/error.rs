//! Error taxonomy for the migration engine.

use thiserror::Error;

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Errors the migration engine can surface to a caller.
///
/// Per-entity introspection/parse failures do not appear here — those are
/// logged and the offending entity is skipped. This enum carries only the
/// failures that abort an operation.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The database is unreachable or authentication failed. Fatal to the
    /// current operation.
    #[error("connection error: {0}")]
    ConnectionError(String),

    /// `INFO FOR DB`/`INFO FOR TABLE` returned in an unrecognized shape
    /// for the database as a whole (not a single entity — that case is a
    /// logged skip, not an error).
    #[error("introspection error: {0}")]
    IntrospectionError(String),

    /// A definition string could not be parsed, and parsing could not
    /// proceed at all (not the single-entity skip case).
    #[error("parse error: {0}")]
    ParseError(String),

    /// `migrate` was called when `desired` is already semantically equal
    /// to the introspected schema. Not an internal error — surfaced to
    /// the caller as a normal outcome.
    #[error("no schema changes detected")]
    NoChanges,

    /// A stored `checksum` or `downChecksum` disagrees with recomputed
    /// content. Fatal to the rollback in progress.
    #[error("integrity violation for migration {id}: expected {expected}, got {actual}")]
    IntegrityViolation {
        id: String,
        expected: String,
        actual: String,
    },

    /// The stored `down` script for the selected migration is empty.
    #[error("rollback refused: migration {0} has an empty down script")]
    EmptyRollback(String),

    /// The database rejected the rollback statements. The history record
    /// is preserved so the operator can diagnose.
    #[error("rollback execution failed for migration {id}: {source}")]
    RollbackExecutionFailed {
        id: String,
        #[source]
        source: Box<MigrateError>,
    },

    /// The database rejected the forward statements. No history record
    /// is written.
    #[error("migration execution failed: {0}")]
    MigrationExecutionFailed(String),

    /// The schema-loader collaborator failed; surfaced unchanged.
    #[error("schema load error: {0}")]
    SchemaLoadError(String),

    /// `rollback` was called but no history records exist.
    #[error("nothing to roll back")]
    NothingToRollback,
}

impl MigrateError {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    pub fn introspection(msg: impl Into<String>) -> Self {
        Self::IntrospectionError(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    pub fn migration_execution(msg: impl Into<String>) -> Self {
        Self::MigrationExecutionFailed(msg.into())
    }

    pub fn schema_load(msg: impl Into<String>) -> Self {
        Self::SchemaLoadError(msg.into())
    }

    /// Whether this error kind is part of the normal control-flow
    /// surface rather than an unexpected failure.
    pub fn is_no_changes(&self) -> bool {
        matches!(self, Self::NoChanges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrity_violation_message_names_both_checksums() {
        let err = MigrateError::IntegrityViolation {
            id: "abc123".into(),
            expected: "sha256.aaa".into(),
            actual: "sha256.bbb".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("sha256.aaa"));
        assert!(msg.contains("sha256.bbb"));
    }

    #[test]
    fn no_changes_is_recognized_as_control_flow() {
        assert!(MigrateError::NoChanges.is_no_changes());
        assert!(!MigrateError::NothingToRollback.is_no_changes());
    }
}

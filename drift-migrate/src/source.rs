//! The schema-loader collaborator boundary.
//!
//! Dynamic schema-file loading lives outside this crate; `SchemaSource`
//! is the interface the migration manager consumes from that
//! collaborator. A caller supplies whatever loader it likes (a static
//! value, a config-file reader, a build-script-generated module) and the
//! manager consumes only the resulting [`Schema`] value.

use async_trait::async_trait;

use drift_schema::Schema;

use crate::error::MigrateResult;

/// Produces the desired [`Schema`] a [`crate::manager::MigrationManager`]
/// diffs against. The concrete loader (file parsing, a DSL, a generated
/// Rust module) lives outside this crate; `drift-migrate` only consumes
/// the trait.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    async fn load(&self) -> MigrateResult<Schema>;
}

/// A [`SchemaSource`] that always returns a fixed, already-constructed
/// schema. The common case for a Rust-native desired schema authored
/// directly as values rather than loaded from a file.
pub struct StaticSchemaSource(Schema);

impl StaticSchemaSource {
    pub fn new(schema: Schema) -> Self {
        Self(schema)
    }
}

#[async_trait]
impl SchemaSource for StaticSchemaSource {
    async fn load(&self) -> MigrateResult<Schema> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_schema::Table;

    #[tokio::test]
    async fn static_source_returns_its_schema_unchanged() {
        let schema = Schema::new().table(Table::new("user"));
        let source = StaticSchemaSource::new(schema.clone());
        let loaded = source.load().await.unwrap();
        assert_eq!(loaded, schema);
    }
}

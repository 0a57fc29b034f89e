use serde::{Deserialize, Serialize};

/// Which top-level collection a [`Change`] affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Table,
    Relation,
    Field,
    Index,
    Event,
    Function,
    Analyzer,
    Scope,
    Param,
    Sequence,
    User,
}

/// The kind of transition a single [`Change`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Create,
    Modify,
    Remove,
    Rename,
    Recreate,
}

/// A structured record of one entity-kind transition between `current`
/// and `desired`, carrying enough context to synthesize both the forward
/// and rollback statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub entity: String,
    pub operation: Operation,
    pub details: String,
    /// For `rename`/`recreate`, the name the entity previously had.
    pub previous_name: Option<String>,
}

impl Change {
    pub fn new(
        kind: EntityKind,
        entity: impl Into<String>,
        operation: Operation,
        details: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            entity: entity.into(),
            operation,
            details: details.into(),
            previous_name: None,
        }
    }

    pub fn with_previous_name(mut self, previous_name: impl Into<String>) -> Self {
        self.previous_name = Some(previous_name.into());
        self
    }
}

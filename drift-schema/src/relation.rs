use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::field::Field;
use crate::index::Index;
use crate::table::Table;

/// The endpoint of a relation: a known table name, or `unknown` when the
/// introspection parser could not extract a `record<X>` type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableRef {
    Named(String),
    Unknown,
}

impl TableRef {
    pub fn named(name: impl Into<String>) -> Self {
        TableRef::Named(name.into())
    }

    pub fn as_name(&self) -> &str {
        match self {
            TableRef::Named(name) => name.as_str(),
            TableRef::Unknown => "unknown",
        }
    }
}

/// A table specialized as a graph edge: `TYPE RELATION IN <from> OUT
/// <to>`. Carries the reserved `in`/`out` fields automatically; those two
/// fields are filtered out of field comparison because the database
/// manages them implicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub table: Table,
    pub from: TableRef,
    pub to: TableRef,
    pub enforced: bool,
}

impl Relation {
    pub fn new(name: impl Into<String>, from: TableRef, to: TableRef) -> Self {
        let name = name.into();
        let table = Table::new(name)
            .field(Field::new("in", format!("record<{}>", from.as_name())))
            .field(Field::new("out", format!("record<{}>", to.as_name())));
        Self {
            table,
            from,
            to,
            enforced: false,
        }
    }

    pub fn enforced(mut self, enforced: bool) -> Self {
        self.enforced = enforced;
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.table = self.table.field(field);
        self
    }

    pub fn index(mut self, index: Index) -> Self {
        self.table = self.table.index(index);
        self
    }

    pub fn event(mut self, event: Event) -> Self {
        self.table = self.table.event(event);
        self
    }

    pub fn name(&self) -> &str {
        &self.table.name
    }

    /// Every field except the two reserved relation endpoints.
    pub fn non_reserved_fields(&self) -> Vec<&Field> {
        self.table
            .fields
            .iter()
            .filter(|f| !f.is_reserved_relation_field())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_relation_carries_reserved_fields() {
        let rel = Relation::new("follows", TableRef::named("user"), TableRef::named("user"));
        assert!(rel.table.get_field("in").is_some());
        assert!(rel.table.get_field("out").is_some());
        assert!(rel.non_reserved_fields().is_empty());
    }

    #[test]
    fn unknown_endpoint_defaults_to_unknown_literal() {
        assert_eq!(TableRef::Unknown.as_name(), "unknown");
    }
}

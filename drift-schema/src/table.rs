use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::field::Field;
use crate::index::Index;

/// A table: an open or closed collection of fields, plus its indexes and
/// events.
///
/// `schemafull` true means every field must be declared; `schemafull`
/// false means the table accepts arbitrary extra fields at write time.
/// A table is created by a `create` change, mutated in place by
/// `modify` changes, and removed by a `remove` change — it is never
/// recreated, except when it is a [`crate::Relation`] whose endpoints
/// change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub schemafull: bool,
    pub fields: Vec<Field>,
    pub indexes: Vec<Index>,
    pub events: Vec<Event>,
    pub comments: Vec<String>,
    /// The table's prior name, if the author is renaming it. Mirrors
    /// [`Field::previous_name`] at the table level — not named explicitly
    /// in the entity's collection shape, but required by the `ALTER TABLE
    /// RENAME <old> TO <new>` form the generators produce.
    pub previous_name: Option<String>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schemafull: true,
            fields: Vec::new(),
            indexes: Vec::new(),
            events: Vec::new(),
            comments: Vec::new(),
            previous_name: None,
        }
    }

    /// Record a rename hint: the table was previously named `name`.
    pub fn renamed_from(mut self, name: impl Into<String>) -> Self {
        self.previous_name = Some(name.into());
        self
    }

    pub fn schemaless(mut self) -> Self {
        self.schemafull = false;
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn get_index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }

    pub fn get_event(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_fields_and_indexes() {
        let table = Table::new("user")
            .field(Field::new("email", "string"))
            .index(Index::new("email_idx", vec!["email".into()]).unique(true));

        assert_eq!(table.name, "user");
        assert!(table.schemafull);
        assert_eq!(table.fields.len(), 1);
        assert!(table.get_index("email_idx").unwrap().unique);
    }
}

use serde::{Deserialize, Serialize};

/// A `DEFINE EVENT` on a table: fires `then_statement` `when` its
/// condition is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub when: String,
    pub then_statement: String,
}

impl Event {
    pub fn new(
        name: impl Into<String>,
        when: impl Into<String>,
        then_statement: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            when: when.into(),
            then_statement: then_statement.into(),
        }
    }
}

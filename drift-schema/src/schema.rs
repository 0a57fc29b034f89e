use serde::{Deserialize, Serialize};

use crate::analyzer::Analyzer;
use crate::function::Function;
use crate::param::Param;
use crate::relation::Relation;
use crate::scope::Scope;
use crate::sequence::Sequence;
use crate::table::Table;
use crate::user::User;

/// A complete schema: one collection per entity-kind.
///
/// Used both for the user-authored *desired* schema and, under the alias
/// [`IntrospectedSchema`](Schema), for the live *current* schema
/// reconstructed by introspection. Names are unique per entity-kind within
/// a schema; this is enforced by whichever collaborator constructs the
/// schema (the author, or the introspection parser), not rechecked here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub tables: Vec<Table>,
    pub relations: Vec<Relation>,
    pub functions: Vec<Function>,
    pub analyzers: Vec<Analyzer>,
    pub scopes: Vec<Scope>,
    pub params: Vec<Param>,
    pub sequences: Vec<Sequence>,
    pub users: Vec<User>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    pub fn relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn function(mut self, function: Function) -> Self {
        self.functions.push(function);
        self
    }

    pub fn analyzer(mut self, analyzer: Analyzer) -> Self {
        self.analyzers.push(analyzer);
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scopes.push(scope);
        self
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn sequence(mut self, sequence: Sequence) -> Self {
        self.sequences.push(sequence);
        self
    }

    pub fn user(mut self, user: User) -> Self {
        self.users.push(user);
        self
    }

    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn get_relation(&self, name: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.name() == name)
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn get_analyzer(&self, name: &str) -> Option<&Analyzer> {
        self.analyzers.iter().find(|a| a.name == name)
    }

    pub fn get_scope(&self, name: &str) -> Option<&Scope> {
        self.scopes.iter().find(|s| s.name == name)
    }

    pub fn get_param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn get_sequence(&self, name: &str) -> Option<&Sequence> {
        self.sequences.iter().find(|s| s.name == name)
    }

    pub fn get_user(&self, name: &str) -> Option<&User> {
        self.users.iter().find(|u| u.name == name)
    }
}

/// The schema reconstructed from live `INFO FOR DB` / `INFO FOR TABLE`
/// introspection. Structurally identical to an authored [`Schema`] —
/// introspection is a total function onto the model, so every
/// introspected schema is equivalent to one that could have been
/// authored.
pub type IntrospectedSchema = Schema;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Field;

    #[test]
    fn builder_and_lookup_round_trip() {
        let schema = Schema::new().table(Table::new("user").field(Field::new("email", "string")));
        let table = schema.get_table("user").expect("table present");
        assert_eq!(table.fields[0].name, "email");
        assert!(schema.get_table("missing").is_none());
    }
}

//! Definition-language generators: pure functions producing the
//! exact forward and removal statement forms for each entity-kind, plus
//! granular `ALTER` forms for narrow modifications.

use drift_schema::{
    Analyzer, Distance, Event, Field, Function, Index, IndexType, Param, Relation, Scope,
    Sequence, Table, TableRef,
};

pub fn generate_table(table: &Table) -> String {
    let schema_kw = if table.schemafull { "SCHEMAFULL" } else { "SCHEMALESS" };
    format!("DEFINE TABLE {} {};", table.name, schema_kw)
}

pub fn generate_relation(relation: &Relation) -> String {
    let schema_kw = if relation.table.schemafull {
        "SCHEMAFULL"
    } else {
        "SCHEMALESS"
    };
    let enforced = if relation.enforced { " ENFORCED" } else { "" };
    format!(
        "DEFINE TABLE {} TYPE RELATION IN {} OUT {}{} {};",
        relation.name(),
        relation.from.as_name(),
        relation.to.as_name(),
        enforced,
        schema_kw
    )
}

fn field_clauses(field: &Field) -> String {
    let mut clauses = Vec::new();
    if !field.type_.is_empty() && field.type_ != "any" {
        clauses.push(format!("TYPE {}", field.type_));
    }
    if let Some(value) = &field.value {
        clauses.push(format!("VALUE {value}"));
    }
    if let Some(assert) = &field.assert {
        clauses.push(format!("ASSERT {assert}"));
    }
    if let Some(default) = &field.default {
        clauses.push(format!("DEFAULT {}", default.trim()));
    }
    if field.optional {
        clauses.push("OPTIONAL".to_string());
    }
    if field.readonly {
        clauses.push("READONLY".to_string());
    }
    if field.flexible {
        clauses.push("FLEXIBLE".to_string());
    }
    if let Some(permissions) = &field.permissions {
        clauses.push(format!("PERMISSIONS {permissions}"));
    }
    if let Some(comment) = &field.comment {
        clauses.push(format!("COMMENT '{comment}'"));
    }
    if clauses.is_empty() {
        String::new()
    } else {
        format!(" {}", clauses.join(" "))
    }
}

pub fn generate_field(field: &Field, table: &str) -> String {
    format!(
        "DEFINE FIELD {} ON TABLE {}{};",
        field.name,
        table,
        field_clauses(field)
    )
}

pub fn generate_field_overwrite(field: &Field, table: &str) -> String {
    format!(
        "DEFINE FIELD OVERWRITE {} ON TABLE {}{};",
        field.name,
        table,
        field_clauses(field)
    )
}

/// One property name as it appears in an `ALTER FIELD` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldProperty {
    Type,
    Default,
    Value,
    Assert,
    Readonly,
    Comment,
}

impl FieldProperty {
    pub fn keyword(self) -> &'static str {
        match self {
            FieldProperty::Type => "TYPE",
            FieldProperty::Default => "DEFAULT",
            FieldProperty::Value => "VALUE",
            FieldProperty::Assert => "ASSERT",
            FieldProperty::Readonly => "READONLY",
            FieldProperty::Comment => "COMMENT",
        }
    }
}

/// `ALTER FIELD <name> <PROPERTY> <value> ON TABLE <t>;` — the granular
/// form used when a modification touches at most three of
/// `{type, default, value, assert, readonly, comment}`.
pub fn generate_alter_field(field: &Field, table: &str, property: FieldProperty) -> String {
    let value = match property {
        FieldProperty::Type => field.type_.clone(),
        FieldProperty::Default => field.default.clone().unwrap_or_default(),
        FieldProperty::Value => field.value.clone().unwrap_or_default(),
        FieldProperty::Assert => field.assert.clone().unwrap_or_default(),
        FieldProperty::Readonly => field.readonly.to_string(),
        FieldProperty::Comment => field.comment.clone().unwrap_or_default(),
    };
    format!(
        "ALTER FIELD {} {} {} ON TABLE {};",
        field.name,
        property.keyword(),
        value,
        table
    )
}

pub fn generate_field_remove(field_name: &str, table: &str) -> String {
    format!("REMOVE FIELD {field_name} ON TABLE {table};")
}

pub fn generate_field_rename(old: &str, new: &str, table: &str) -> String {
    format!("ALTER FIELD {old} RENAME TO {new} ON TABLE {table};")
}

fn index_clauses(index: &Index) -> String {
    let cols = index.columns.join(", ");
    let mut head = format!("FIELDS {cols}");
    match index.index_type {
        IndexType::Btree | IndexType::Hash => {
            if index.unique {
                head.push_str(" UNIQUE");
            }
        }
        IndexType::Search => {
            head.push_str(" SEARCH");
            if let Some(analyzer) = &index.analyzer {
                head.push_str(&format!(" ANALYZER {analyzer}"));
            }
            if index.highlights {
                head.push_str(" HIGHLIGHTS");
            }
            if let Some(bm25) = &index.bm25 {
                match bm25 {
                    Some(params) => head.push_str(&format!(" BM25({}, {})", params.k1, params.b)),
                    None => head.push_str(" BM25"),
                }
            }
        }
        IndexType::Mtree => {
            head.push_str(" MTREE");
            if let Some(dim) = index.dimension {
                head.push_str(&format!(" DIMENSION {dim}"));
            }
            if let Some(dist) = index.dist {
                head.push_str(&format!(" DIST {}", distance_name(dist)));
            }
        }
        IndexType::Hnsw => {
            head.push_str(" HNSW");
            if let Some(dim) = index.dimension {
                head.push_str(&format!(" DIMENSION {dim}"));
            }
            if let Some(dist) = index.dist {
                head.push_str(&format!(" DIST {}", distance_name(dist)));
            }
            if let Some(efc) = index.efc {
                head.push_str(&format!(" EFC {efc}"));
            }
            if let Some(m) = index.m {
                head.push_str(&format!(" M {m}"));
            }
            if let Some(m0) = index.m0 {
                head.push_str(&format!(" M0 {m0}"));
            }
            if let Some(capacity) = index.capacity {
                head.push_str(&format!(" CAPACITY {capacity}"));
            }
            if let Some(lm) = index.lm {
                head.push_str(&format!(" LM {lm}"));
            }
        }
    }
    head
}

fn distance_name(dist: Distance) -> &'static str {
    match dist {
        Distance::Euclidean => "EUCLIDEAN",
        Distance::Cosine => "COSINE",
        Distance::Manhattan => "MANHATTAN",
        Distance::Hamming => "HAMMING",
        Distance::Minkowski => "MINKOWSKI",
        Distance::Chebyshev => "CHEBYSHEV",
        Distance::Jaccard => "JACCARD",
        Distance::Pearson => "PEARSON",
    }
}

pub fn generate_index(index: &Index, table: &str) -> String {
    format!(
        "DEFINE INDEX {} ON TABLE {} {};",
        index.name,
        table,
        index_clauses(index)
    )
}

pub fn generate_index_remove(index_name: &str, table: &str) -> String {
    format!("REMOVE INDEX {index_name} ON TABLE {table};")
}

pub fn generate_event(event: &Event, table: &str, overwrite: bool) -> String {
    let kw = if overwrite { "DEFINE EVENT OVERWRITE" } else { "DEFINE EVENT" };
    format!(
        "{} {} ON TABLE {} WHEN {} THEN {};",
        kw, event.name, table, event.when, event.then_statement
    )
}

pub fn generate_event_remove(event_name: &str, table: &str) -> String {
    format!("REMOVE EVENT {event_name} ON TABLE {table};")
}

pub fn generate_function(function: &Function, overwrite: bool) -> String {
    let kw = if overwrite { "DEFINE FUNCTION OVERWRITE" } else { "DEFINE FUNCTION" };
    let params = function
        .parameters
        .iter()
        .map(|p| format!("${}: {}", p.name, p.type_))
        .collect::<Vec<_>>()
        .join(", ");
    let returns = function
        .return_type
        .as_ref()
        .map(|t| format!(" -> {t}"))
        .unwrap_or_default();
    format!(
        "{} fn::{}({}){} {{ {} }};",
        kw, function.name, params, returns, function.body
    )
}

pub fn generate_function_remove(name: &str) -> String {
    format!("REMOVE FUNCTION fn::{name};")
}

pub fn generate_scope(scope: &Scope, overwrite: bool) -> String {
    let kw = if overwrite { "DEFINE ACCESS OVERWRITE" } else { "DEFINE ACCESS" };
    let mut tail = String::new();
    if let Some(signup) = &scope.signup {
        tail.push_str(&format!(" SIGNUP ({signup})"));
    }
    if let Some(signin) = &scope.signin {
        tail.push_str(&format!(" SIGNIN ({signin})"));
    }
    if let Some(session) = &scope.session {
        tail.push_str(&format!(" DURATION FOR SESSION {session}"));
    }
    format!("{} {} ON DATABASE TYPE RECORD{};", kw, scope.name, tail)
}

pub fn generate_scope_remove(name: &str) -> String {
    format!("REMOVE ACCESS {name} ON DATABASE;")
}

pub fn generate_analyzer(analyzer: &Analyzer, overwrite: bool) -> String {
    let kw = if overwrite { "DEFINE ANALYZER OVERWRITE" } else { "DEFINE ANALYZER" };
    let mut tail = String::new();
    if !analyzer.tokenizers.is_empty() {
        tail.push_str(&format!(" TOKENIZERS {}", analyzer.tokenizers.join(",")));
    }
    if !analyzer.filters.is_empty() {
        tail.push_str(&format!(" FILTERS {}", analyzer.filters.join(",")));
    }
    format!("{} {}{};", kw, analyzer.name, tail)
}

pub fn generate_analyzer_remove(name: &str) -> String {
    format!("REMOVE ANALYZER {name};")
}

pub fn generate_param(param: &Param) -> String {
    format!("DEFINE PARAM ${} VALUE {};", param.name, param.value)
}

pub fn generate_alter_param(param: &Param) -> String {
    format!("ALTER PARAM ${} VALUE {};", param.name, param.value)
}

pub fn generate_param_remove(name: &str) -> String {
    format!("REMOVE PARAM ${name};")
}

pub fn generate_sequence(sequence: &Sequence) -> String {
    match sequence.start {
        Some(start) => format!("DEFINE SEQUENCE {} START {};", sequence.name, start),
        None => format!("DEFINE SEQUENCE {};", sequence.name),
    }
}

pub fn generate_sequence_remove(name: &str) -> String {
    format!("REMOVE SEQUENCE {name};")
}

pub fn generate_table_remove(name: &str) -> String {
    format!("REMOVE TABLE {name};")
}

pub fn generate_rename(kind: &str, old: &str, new: &str) -> String {
    format!("ALTER {kind} RENAME {old} TO {new};")
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_schema::Table;
    use pretty_assertions::assert_eq;

    #[test]
    fn generates_create_table() {
        assert_eq!(
            generate_table(&Table::new("user")),
            "DEFINE TABLE user SCHEMAFULL;"
        );
    }

    #[test]
    fn generates_field_with_assert_and_default() {
        let field = Field::new("email", "string").assert("$value != NONE");
        assert_eq!(
            generate_field(&field, "user"),
            "DEFINE FIELD email ON TABLE user TYPE string ASSERT $value != NONE;"
        );
    }

    #[test]
    fn generates_unique_index() {
        let index = Index::new("email", vec!["email".into()]).unique(true);
        assert_eq!(
            generate_index(&index, "user"),
            "DEFINE INDEX email ON TABLE user FIELDS email UNIQUE;"
        );
    }

    #[test]
    fn generates_granular_alter_default() {
        let field = Field::new("status", "string").default_value("'active'");
        assert_eq!(
            generate_alter_field(&field, "user", FieldProperty::Default),
            "ALTER FIELD status DEFAULT 'active' ON TABLE user;"
        );
    }

    #[test]
    fn generates_field_rename() {
        assert_eq!(
            generate_field_rename("email", "emailAddress", "user"),
            "ALTER FIELD email RENAME TO emailAddress ON TABLE user;"
        );
    }
}

//! Introspection parser: turns raw `INFO FOR DB` / `INFO FOR TABLE`
//! definition-language strings into an [`IntrospectedSchema`].
//!
//! The grammar is parsed with keyword-boundary matching and a brace/paren
//! depth scanner rather than a grammar crate — a small recursive-descent
//! parser could replace this without changing the output model.
//! Per-entity parse failures never abort the whole
//! introspection: they are appended to the returned warning list and the
//! offending entity is omitted.

use drift_schema::{
    Analyzer, Event, Field, Function, Index, IndexType, Param, Parameter, Relation, Schema,
    Scope, Sequence, Table, TableRef,
};

use crate::client::{DbInfo, TableInfo};

/// Name of the history table, excluded from introspection.
pub const HISTORY_TABLE: &str = "_migrations";

/// Result of parsing a full `INFO FOR DB` + per-table response set:
/// the schema reconstructed so far, and a log of entities skipped
/// because they failed to parse.
#[derive(Debug, Clone, Default)]
pub struct IntrospectionResult {
    pub schema: Schema,
    pub warnings: Vec<String>,
}

/// Parse a full database introspection snapshot.
pub fn parse_introspection(db: &DbInfo, tables: &std::collections::HashMap<String, TableInfo>) -> IntrospectionResult {
    let mut result = IntrospectionResult::default();

    for (table_name, table_info) in tables {
        if table_name == HISTORY_TABLE {
            continue;
        }
        let Some(def) = db.tables.get(table_name) else {
            result
                .warnings
                .push(format!("table `{table_name}` has no DEFINE TABLE statement; skipped"));
            continue;
        };
        match parse_table_or_relation(table_name, def, table_info) {
            Ok(ParsedTable::Table(table)) => result.schema.tables.push(table),
            Ok(ParsedTable::Relation(relation)) => result.schema.relations.push(relation),
            Err(e) => result
                .warnings
                .push(format!("table `{table_name}`: {e}")),
        }
    }

    for (name, def) in &db.functions {
        match parse_function(name, def) {
            Ok(f) => result.schema.functions.push(f),
            Err(e) => result.warnings.push(format!("function `{name}`: {e}")),
        }
    }

    for (name, def) in &db.accesses {
        match parse_scope(name, def) {
            Ok(s) => result.schema.scopes.push(s),
            Err(e) => result.warnings.push(format!("access `{name}`: {e}")),
        }
    }

    for (name, def) in &db.analyzers {
        match parse_analyzer(name, def) {
            Ok(a) => result.schema.analyzers.push(a),
            Err(e) => result.warnings.push(format!("analyzer `{name}`: {e}")),
        }
    }

    for (name, def) in &db.params {
        match parse_param(name, def) {
            Ok(p) => result.schema.params.push(p),
            Err(e) => result.warnings.push(format!("param `{name}`: {e}")),
        }
    }

    for (name, def) in &db.sequences {
        match parse_sequence(name, def) {
            Ok(s) => result.schema.sequences.push(s),
            Err(e) => result.warnings.push(format!("sequence `{name}`: {e}")),
        }
    }

    // `users` has neither an INFO FOR DB key nor a dedicated generator
    // form in the external-interfaces contract; it is not introspected
    // or diffed (see DESIGN.md).

    result
}

enum ParsedTable {
    Table(Table),
    Relation(Relation),
}

fn parse_table_or_relation(
    name: &str,
    table_def: &str,
    table_info: &TableInfo,
) -> Result<ParsedTable, String> {
    let schemafull = !table_def.to_uppercase().contains("SCHEMALESS");
    let comment = extract_top_level_clause(table_def, "COMMENT");

    let mut fields = Vec::new();
    for (field_name, def) in &table_info.fields {
        if let Some(parent) = field_name.strip_suffix(".*") {
            if table_info
                .fields
                .get(parent)
                .map(|t| t.to_uppercase().contains("ARRAY"))
                .unwrap_or(false)
            {
                continue;
            }
        }
        fields.push(parse_field(field_name, def)?);
    }

    let mut indexes = Vec::new();
    for (idx_name, def) in &table_info.indexes {
        indexes.push(parse_index(idx_name, def)?);
    }

    let mut events = Vec::new();
    for (ev_name, def) in &table_info.events {
        events.push(parse_event(ev_name, def)?);
    }

    // A table is a relation iff it declares both `in` and `out` fields.
    // No name-based heuristic is used.
    let has_in = fields.iter().any(|f| f.name == "in");
    let has_out = fields.iter().any(|f| f.name == "out");

    if has_in && has_out {
        let from = fields
            .iter()
            .find(|f| f.name == "in")
            .and_then(|f| extract_record_type(&f.type_))
            .map(TableRef::Named)
            .unwrap_or(TableRef::Unknown);
        let to = fields
            .iter()
            .find(|f| f.name == "out")
            .and_then(|f| extract_record_type(&f.type_))
            .map(TableRef::Named)
            .unwrap_or(TableRef::Unknown);
        let enforced = table_def.to_uppercase().contains("ENFORCED");

        let mut table = Table::new(name);
        table.schemafull = schemafull;
        table.fields = fields;
        table.indexes = indexes;
        table.events = events;
        if let Some(c) = comment {
            table.comments.push(c);
        }
        Ok(ParsedTable::Relation(Relation {
            table,
            from,
            to,
            enforced,
        }))
    } else {
        let mut table = Table::new(name);
        table.schemafull = schemafull;
        table.fields = fields;
        table.indexes = indexes;
        table.events = events;
        if let Some(c) = comment {
            table.comments.push(c);
        }
        Ok(ParsedTable::Table(table))
    }
}

/// Extract `X` from a `record<X>` type expression.
fn extract_record_type(type_expr: &str) -> Option<String> {
    let start = type_expr.find("record<")? + "record<".len();
    let end = type_expr[start..].find('>')? + start;
    Some(type_expr[start..end].trim().to_string())
}

const FIELD_KEYWORDS: &[&str] = &[
    "TYPE",
    "VALUE",
    "ASSERT",
    "DEFAULT",
    "PERMISSIONS",
    "COMMENT",
    "READONLY",
    "FLEXIBLE",
    "FLEX",
    "OPTIONAL",
];

fn parse_field(name: &str, def: &str) -> Result<Field, String> {
    let clauses = split_top_level_clauses(def, FIELD_KEYWORDS);
    let mut field = Field::new(name, "any");
    field.if_not_exists = contains_word(def, "EXISTS") && contains_word(def, "NOT");
    field.overwrite = contains_word(def, "OVERWRITE");

    for (keyword, content) in clauses {
        match keyword.as_str() {
            "TYPE" => field.type_ = content,
            // `<future> { ... }` blocks are opaque: stored as-is, never
            // parsed further.
            "VALUE" => field.value = Some(content),
            "ASSERT" => field.assert = Some(content),
            "DEFAULT" => field.default = Some(content),
            "PERMISSIONS" => field.permissions = Some(content),
            "COMMENT" => field.comment = Some(unquote(&content)),
            "READONLY" => field.readonly = true,
            "FLEXIBLE" | "FLEX" => field.flexible = true,
            "OPTIONAL" => field.optional = true,
            _ => {}
        }
    }
    if field.type_.to_lowercase().starts_with("option<") {
        field.optional = true;
    }
    Ok(field)
}

const INDEX_KEYWORDS: &[&str] = &[
    "FIELDS", "COLUMNS", "UNIQUE", "SEARCH", "ANALYZER", "HIGHLIGHTS", "BM25", "MTREE", "HNSW",
    "DIMENSION", "DIST", "EFC", "CAPACITY", "M0", "LM", "M",
];

fn parse_index(name: &str, def: &str) -> Result<Index, String> {
    let clauses = split_top_level_clauses(def, INDEX_KEYWORDS);
    let mut columns = Vec::new();
    let mut index = Index::new(name, Vec::new());

    for (keyword, content) in &clauses {
        match keyword.as_str() {
            "FIELDS" | "COLUMNS" => {
                columns = content.split(',').map(|c| c.trim().to_string()).collect();
            }
            "UNIQUE" => index.unique = true,
            "SEARCH" => index.index_type = IndexType::Search,
            "ANALYZER" => index.analyzer = Some(content.trim().to_string()),
            "HIGHLIGHTS" => index.highlights = true,
            "BM25" => {
                index.index_type = IndexType::Search;
                index.bm25 = Some(parse_bm25_params(content));
            }
            "MTREE" => index.index_type = IndexType::Mtree,
            "HNSW" => index.index_type = IndexType::Hnsw,
            "DIMENSION" => index.dimension = content.trim().parse().ok(),
            "DIST" => index.dist = parse_distance(content.trim()),
            "EFC" => index.efc = content.trim().parse().ok(),
            "CAPACITY" => index.capacity = content.trim().parse().ok(),
            "M0" => index.m0 = content.trim().parse().ok(),
            "LM" => index.lm = content.trim().parse().ok(),
            "M" => index.m = content.trim().parse().ok(),
            _ => {}
        }
    }
    if columns.is_empty() {
        return Err("missing FIELDS clause".to_string());
    }
    index.columns = columns;
    Ok(index)
}

fn parse_bm25_params(content: &str) -> Option<drift_schema::Bm25Params> {
    let inner = content.trim().trim_start_matches('(').trim_end_matches(')');
    let mut parts = inner.split(',').map(|p| p.trim());
    let k1 = parts.next()?.parse().ok()?;
    let b = parts.next()?.parse().ok()?;
    Some(drift_schema::Bm25Params { k1, b })
}

fn parse_distance(s: &str) -> Option<drift_schema::Distance> {
    use drift_schema::Distance::*;
    match s.to_uppercase().as_str() {
        "EUCLIDEAN" => Some(Euclidean),
        "COSINE" => Some(Cosine),
        "MANHATTAN" => Some(Manhattan),
        "HAMMING" => Some(Hamming),
        "MINKOWSKI" => Some(Minkowski),
        "CHEBYSHEV" => Some(Chebyshev),
        "JACCARD" => Some(Jaccard),
        "PEARSON" => Some(Pearson),
        _ => None,
    }
}

fn parse_event(name: &str, def: &str) -> Result<Event, String> {
    let clauses = split_top_level_clauses(def, &["WHEN", "THEN"]);
    let mut when = None;
    let mut then = None;
    for (keyword, content) in clauses {
        match keyword.as_str() {
            "WHEN" => when = Some(content),
            "THEN" => then = Some(content),
            _ => {}
        }
    }
    Ok(Event::new(
        name,
        when.ok_or("missing WHEN clause")?,
        then.ok_or("missing THEN clause")?,
    ))
}

fn parse_function(name: &str, def: &str) -> Result<Function, String> {
    let fn_marker = "fn::";
    let name_start = def.find(fn_marker).map(|i| i + fn_marker.len()).unwrap_or(0);
    let paren_start = def[name_start..]
        .find('(')
        .map(|i| i + name_start)
        .ok_or("missing parameter list")?;
    let fn_name = def[name_start..paren_start].trim().to_string();
    let fn_name = if fn_name.is_empty() { name.to_string() } else { fn_name };

    let paren_end = find_matching(&def[paren_start..], '(', ')')
        .map(|i| i + paren_start)
        .ok_or("unbalanced parameter list")?;
    let params_raw = &def[paren_start + 1..paren_end];

    let mut function = Function::new(fn_name, String::new());
    for p in params_raw.split(',') {
        let p = p.trim();
        if p.is_empty() {
            continue;
        }
        let mut parts = p.splitn(2, ':');
        let pname = parts.next().unwrap_or("").trim().trim_start_matches('$');
        let ptype = parts.next().unwrap_or("any").trim();
        function = function.parameter(pname, ptype);
    }

    let rest = &def[paren_end + 1..];
    if let Some(arrow) = rest.find("->") {
        let brace = rest.find('{').unwrap_or(rest.len());
        function.return_type = Some(rest[arrow + 2..brace].trim().to_string());
    }

    let brace_start = rest.find('{').ok_or("missing function body")?;
    let brace_end = find_matching(&rest[brace_start..], '{', '}')
        .map(|i| i + brace_start)
        .ok_or("unbalanced function body")?;
    function.body = rest[brace_start + 1..brace_end].trim().to_string();

    Ok(function)
}

fn parse_scope(name: &str, def: &str) -> Result<Scope, String> {
    let mut scope = Scope::new(name);
    let clauses = split_top_level_clauses(def, &["SIGNUP", "SIGNIN", "DURATION"]);
    for (keyword, content) in clauses {
        match keyword.as_str() {
            "SIGNUP" => scope.signup = Some(strip_outer_parens(&content)),
            "SIGNIN" => scope.signin = Some(strip_outer_parens(&content)),
            "DURATION" => {
                let upper = content.to_uppercase();
                if let Some(pos) = upper.find("SESSION") {
                    scope.session = content[pos + "SESSION".len()..]
                        .split_whitespace()
                        .next()
                        .map(|s| s.to_string());
                }
            }
            _ => {}
        }
    }
    Ok(scope)
}

fn strip_outer_parens(s: &str) -> String {
    let s = s.trim();
    if s.starts_with('(') && s.ends_with(')') {
        s[1..s.len() - 1].trim().to_string()
    } else {
        s.to_string()
    }
}

fn parse_analyzer(name: &str, def: &str) -> Result<Analyzer, String> {
    let mut analyzer = Analyzer::new(name);
    let clauses = split_top_level_clauses(def, &["TOKENIZERS", "FILTERS"]);
    for (keyword, content) in clauses {
        let items: Vec<String> = content.split(',').map(|s| s.trim().to_string()).collect();
        match keyword.as_str() {
            "TOKENIZERS" => analyzer.tokenizers = items,
            "FILTERS" => analyzer.filters = items,
            _ => {}
        }
    }
    Ok(analyzer)
}

fn parse_param(name: &str, def: &str) -> Result<Param, String> {
    let clauses = split_top_level_clauses(def, &["VALUE"]);
    let value = clauses
        .into_iter()
        .find(|(k, _)| k == "VALUE")
        .map(|(_, v)| v)
        .ok_or("missing VALUE clause")?;
    Ok(Param::new(name.trim_start_matches('$'), value))
}

fn parse_sequence(name: &str, def: &str) -> Result<Sequence, String> {
    let mut sequence = Sequence::new(name);
    let clauses = split_top_level_clauses(def, &["START"]);
    for (keyword, content) in clauses {
        if keyword == "START" {
            sequence.start = content.trim().parse().ok();
        }
    }
    Ok(sequence)
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    if (s.starts_with('\'') && s.ends_with('\'') && s.len() >= 2)
        || (s.starts_with('"') && s.ends_with('"') && s.len() >= 2)
    {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

fn contains_word(haystack: &str, word: &str) -> bool {
    haystack
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .any(|w| w.eq_ignore_ascii_case(word))
}

fn extract_top_level_clause(def: &str, keyword: &str) -> Option<String> {
    split_top_level_clauses(def, &[keyword])
        .into_iter()
        .find(|(k, _)| k == keyword)
        .map(|(_, v)| unquote(&v))
}

fn find_matching(s: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Split `body` into an ordered list of `(KEYWORD, content)` pairs, where
/// each keyword is matched as a whole word at brace/paren depth zero, and
/// its content runs until the next top-level keyword (or the end of the
/// string), accounting for brace depth throughout.
fn split_top_level_clauses(body: &str, keywords: &[&str]) -> Vec<(String, String)> {
    let bytes = body.as_bytes();
    let mut depth = 0i32;
    let mut positions: Vec<(usize, &str)> = Vec::new();
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'{' => depth += 1,
            b')' | b'}' => depth -= 1,
            _ => {}
        }
        if depth == 0 {
            for kw in keywords {
                if word_matches_at(body, i, kw) {
                    positions.push((i, kw));
                    break;
                }
            }
        }
        i += 1;
    }

    let mut result = Vec::with_capacity(positions.len());
    for (idx, (start, kw)) in positions.iter().enumerate() {
        let end = positions.get(idx + 1).map(|(s, _)| *s).unwrap_or(body.len());
        let content = body[start + kw.len()..end]
            .trim()
            .trim_end_matches(';')
            .trim()
            .to_string();
        result.push((kw.to_uppercase(), content));
    }
    result
}

fn word_matches_at(s: &str, idx: usize, word: &str) -> bool {
    if idx + word.len() > s.len() {
        return false;
    }
    if !s[idx..idx + word.len()].eq_ignore_ascii_case(word) {
        return false;
    }
    let before_ok = idx == 0
        || {
            let prev = s.as_bytes()[idx - 1];
            !(prev.is_ascii_alphanumeric() || prev == b'_')
        };
    let after_idx = idx + word.len();
    let after_ok = after_idx >= s.len() || {
        let next = s.as_bytes()[after_idx];
        !(next.is_ascii_alphanumeric() || next == b'_')
    };
    before_ok && after_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn parses_simple_field() {
        let field = parse_field(
            "email",
            "DEFINE FIELD email ON user TYPE string ASSERT $value != NONE PERMISSIONS FULL;",
        )
        .unwrap();
        assert_eq!(field.type_, "string");
        assert_eq!(field.assert.as_deref(), Some("$value != NONE"));
    }

    #[test]
    fn parses_field_with_braced_future_value() {
        let field = parse_field(
            "score",
            "DEFINE FIELD score ON post TYPE number VALUE <future> { math::round($this.raw) };",
        )
        .unwrap();
        assert!(field.value.unwrap().contains("future"));
    }

    #[test]
    fn classifies_relation_by_in_out_fields() {
        let mut table_info = TableInfo::default();
        table_info
            .fields
            .insert("in".to_string(), "DEFINE FIELD in ON follows TYPE record<user>;".to_string());
        table_info
            .fields
            .insert("out".to_string(), "DEFINE FIELD out ON follows TYPE record<user>;".to_string());
        let parsed =
            parse_table_or_relation("follows", "DEFINE TABLE follows SCHEMAFULL;", &table_info)
                .unwrap();
        assert!(matches!(parsed, ParsedTable::Relation(_)));
    }

    #[test]
    fn name_with_underscore_is_not_treated_as_relation() {
        let mut table_info = TableInfo::default();
        table_info.fields.insert(
            "email".to_string(),
            "DEFINE FIELD email ON user_profile TYPE string;".to_string(),
        );
        let parsed = parse_table_or_relation(
            "user_profile",
            "DEFINE TABLE user_profile SCHEMAFULL;",
            &table_info,
        )
        .unwrap();
        assert!(matches!(parsed, ParsedTable::Table(_)));
    }

    #[test]
    fn parses_index_with_fields_and_unique() {
        let idx = parse_index("email_idx", "DEFINE INDEX email_idx ON user FIELDS email UNIQUE;").unwrap();
        assert_eq!(idx.columns, vec!["email".to_string()]);
        assert!(idx.unique);
    }

    #[test]
    fn parses_function_signature_and_body() {
        let f = parse_function(
            "fn::tax",
            "DEFINE FUNCTION fn::tax($amount: number, $rate: number) -> number { RETURN $amount * $rate; };",
        )
        .unwrap();
        assert_eq!(f.parameters.len(), 2);
        assert_eq!(f.return_type.as_deref(), Some("number"));
        assert!(f.body.contains("RETURN"));
    }

    #[test]
    fn parses_scope_session_duration() {
        let scope = parse_scope(
            "user",
            "DEFINE ACCESS user ON DATABASE TYPE RECORD SIGNUP (CREATE user) SIGNIN (SELECT * FROM user) DURATION FOR SESSION 12h;",
        )
        .unwrap();
        assert_eq!(scope.session.as_deref(), Some("12h"));
        assert_eq!(scope.signup.as_deref(), Some("CREATE user"));
    }

    #[test]
    fn array_element_field_dropped_when_parent_is_array() {
        let mut table_info = TableInfo::default();
        table_info
            .fields
            .insert("tags".to_string(), "DEFINE FIELD tags ON post TYPE array<string>;".to_string());
        table_info
            .fields
            .insert("tags.*".to_string(), "DEFINE FIELD tags.* ON post TYPE string;".to_string());
        let parsed =
            parse_table_or_relation("post", "DEFINE TABLE post SCHEMAFULL;", &table_info).unwrap();
        let ParsedTable::Table(table) = parsed else {
            panic!("expected table")
        };
        assert_eq!(table.fields.len(), 1);
        assert_eq!(table.fields[0].name, "tags");
    }

    #[test]
    fn unparseable_entity_is_skipped_not_fatal() {
        let mut tables = HashMap::new();
        let mut table_info = TableInfo::default();
        table_info
            .indexes
            .insert("bad_idx".to_string(), "DEFINE INDEX bad_idx ON user;".to_string());
        tables.insert("user".to_string(), table_info);

        let mut db = DbInfo::default();
        db.tables.insert("user".to_string(), "DEFINE TABLE user SCHEMAFULL;".to_string());

        let result = parse_introspection(&db, &tables);
        assert_eq!(result.schema.tables.len(), 1);
        assert_eq!(result.schema.tables[0].indexes.len(), 0);
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn history_table_excluded() {
        let mut tables = HashMap::new();
        tables.insert(HISTORY_TABLE.to_string(), TableInfo::default());
        let mut db = DbInfo::default();
        db.tables
            .insert(HISTORY_TABLE.to_string(), "DEFINE TABLE _migrations SCHEMAFULL;".to_string());
        let result = parse_introspection(&db, &tables);
        assert!(result.schema.tables.is_empty());
    }
}

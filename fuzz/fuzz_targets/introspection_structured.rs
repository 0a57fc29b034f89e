//! Structured fuzzing for the introspection parser.
//!
//! Generates semi-valid `DEFINE FIELD` definition strings with clauses in
//! arbitrary order — the parser is required to handle that.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_introspection_structured
//! ```

#![no_main]

use std::collections::HashMap;

use arbitrary::{Arbitrary, Unstructured};
use drift_migrate::{parse_introspection, DbInfo, TableInfo};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum FuzzClause {
    Type(FuzzType),
    Flexible,
    Optional,
    Readonly,
    Value(String),
    Assert(String),
    Default(String),
    Permissions(String),
    Comment(String),
}

#[derive(Debug, Arbitrary)]
enum FuzzType {
    String,
    Number,
    Datetime,
    Bool,
    OptionOfString,
    RecordOfUser,
    ArrayOfString,
    Future,
}

impl FuzzType {
    fn to_string(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Datetime => "datetime",
            Self::Bool => "bool",
            Self::OptionOfString => "option<string>",
            Self::RecordOfUser => "record<user>",
            Self::ArrayOfString => "array<string>",
            Self::Future => "future",
        }
    }
}

impl FuzzClause {
    fn to_string(&self) -> String {
        match self {
            Self::Type(t) => format!("TYPE {}", t.to_string()),
            Self::Flexible => "FLEXIBLE".to_string(),
            Self::Optional => "OPTIONAL".to_string(),
            Self::Readonly => "READONLY".to_string(),
            Self::Value(e) => format!("VALUE {}", sanitize(e)),
            Self::Assert(e) => format!("ASSERT {}", sanitize(e)),
            Self::Default(e) => format!("DEFAULT {}", sanitize(e)),
            Self::Permissions(p) => format!("PERMISSIONS {}", sanitize(p)),
            Self::Comment(c) => format!("COMMENT '{}'", sanitize(c)),
        }
    }
}

#[derive(Debug, Arbitrary)]
struct FuzzFieldDef {
    name: String,
    clauses: Vec<FuzzClause>,
}

impl FuzzFieldDef {
    fn to_string(&self) -> String {
        let name = sanitize_identifier(&self.name);
        let clauses: Vec<String> = self.clauses.iter().map(FuzzClause::to_string).collect();
        format!("DEFINE FIELD {} ON t {};", name, clauses.join(" "))
    }
}

fn sanitize_identifier(s: &str) -> String {
    let cleaned: String = s.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '_').take(30).collect();
    if cleaned.is_empty() || cleaned.chars().next().unwrap().is_ascii_digit() {
        format!("f{cleaned}")
    } else {
        cleaned
    }
}

fn sanitize(s: &str) -> String {
    s.chars().filter(|c| !matches!(c, '\n' | '\r')).take(60).collect()
}

fuzz_target!(|data: &[u8]| {
    let mut unstructured = Unstructured::new(data);
    if let Ok(field) = FuzzFieldDef::arbitrary(&mut unstructured) {
        let field_def = field.to_string();

        let mut db = DbInfo::default();
        db.tables.insert("t".to_string(), "DEFINE TABLE t SCHEMAFULL;".to_string());

        let field_name = sanitize_identifier(&field.name);
        let mut table_info = TableInfo::default();
        table_info.fields.insert(field_name, field_def);

        let mut tables = HashMap::new();
        tables.insert("t".to_string(), table_info);

        let _ = parse_introspection(&db, &tables);
    }
});

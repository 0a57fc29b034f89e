//! Fuzz target for the introspection parser.
//!
//! Feeds arbitrary bytes as a single table's `DEFINE TABLE` string plus a
//! `DEFINE FIELD` string and runs them through `parse_introspection`. The
//! parser must never panic, only return a schema with the offending entity
//! skipped and a warning recorded.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_introspection_parser
//! ```

#![no_main]

use std::collections::HashMap;

use drift_migrate::{parse_introspection, DbInfo, TableInfo};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let mut db = DbInfo::default();
        db.tables.insert("t".to_string(), format!("DEFINE TABLE t {input};"));

        let mut table_info = TableInfo::default();
        table_info.fields.insert("f".to_string(), format!("DEFINE FIELD f ON t {input};"));

        let mut tables = HashMap::new();
        tables.insert("t".to_string(), table_info);

        // Must not panic, regardless of how malformed `input` is.
        let _ = parse_introspection(&db, &tables);
    }
});

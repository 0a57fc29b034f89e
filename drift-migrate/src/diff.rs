//! The structural diff engine: compares a desired schema against
//! an introspected current schema and produces `{up, down, changes}`.

use std::collections::HashSet;

use chrono::Utc;
use drift_schema::{
    Analyzer, Change, EntityKind, Field, Function, Index, Operation, Param, Relation, Schema,
    Scope, Sequence, Table,
};

use crate::generate::*;
use crate::normalize::{
    duration_to_days, normalize_comment, normalize_default, normalize_expr, normalize_option_type,
    normalize_permissions,
};

/// One forward/rollback statement pair plus the [`Change`] it represents.
struct DiffEntry {
    forward: Vec<String>,
    rollback: Vec<String>,
    change: Change,
}

/// The diff engine's output: a newline-joined forward script, the
/// matching rollback script (reverse order), and the structured change
/// log.
#[derive(Debug, Clone)]
pub struct DiffResult {
    pub up: String,
    pub down: String,
    pub changes: Vec<Change>,
}

/// Short-circuits on the first detected difference. Must agree with
/// `diff_schema(..).changes.len() > 0`.
pub fn has_changes(desired: &Schema, current: &Schema) -> bool {
    !diff_entries(desired, current).is_empty()
}

/// Run the full diff and assemble `{up, down, changes}`.
pub fn diff_schema(desired: &Schema, current: &Schema) -> DiffResult {
    let entries = diff_entries(desired, current);

    let mut up_lines = vec![format!("-- migration generated {}", Utc::now().to_rfc3339())];
    for entry in &entries {
        up_lines.extend(entry.forward.iter().cloned());
    }

    let mut down_lines = Vec::new();
    for entry in entries.iter().rev() {
        down_lines.extend(entry.rollback.iter().cloned());
    }

    let changes = entries.into_iter().map(|e| e.change).collect();
    DiffResult {
        up: up_lines.join("\n"),
        down: down_lines.join("\n"),
        changes,
    }
}

/// Ordering: tables → relations → functions → analyzers → scopes →
/// params → sequences. `users` has no introspection key or
/// generator form in the external-interfaces contract and is not
/// diffed (see DESIGN.md).
fn diff_entries(desired: &Schema, current: &Schema) -> Vec<DiffEntry> {
    let mut entries = Vec::new();
    entries.extend(diff_tables(&desired.tables, &current.tables));
    entries.extend(diff_relations(&desired.relations, &current.relations));
    entries.extend(diff_overwrite_group(
        &desired.functions,
        &current.functions,
        EntityKind::Function,
        |f| f.name.clone(),
        functions_equal,
        |f| generate_function(f, false),
        |f| generate_function(f, true),
        |name| generate_function_remove(name),
    ));
    entries.extend(diff_overwrite_group(
        &desired.analyzers,
        &current.analyzers,
        EntityKind::Analyzer,
        |a| a.name.clone(),
        analyzers_equal,
        |a| generate_analyzer(a, false),
        |a| generate_analyzer(a, true),
        |name| generate_analyzer_remove(name),
    ));
    entries.extend(diff_overwrite_group(
        &desired.scopes,
        &current.scopes,
        EntityKind::Scope,
        |s| s.name.clone(),
        scopes_equal,
        |s| generate_scope(s, false),
        |s| generate_scope(s, true),
        |name| generate_scope_remove(name),
    ));
    entries.extend(diff_params(&desired.params, &current.params));
    entries.extend(diff_sequences(&desired.sequences, &current.sequences));
    entries
}

// ---------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------

fn diff_tables(desired: &[Table], current: &[Table]) -> Vec<DiffEntry> {
    let mut creates_and_modifies = Vec::new();
    let mut removes = Vec::new();
    let mut consumed: HashSet<String> = HashSet::new();

    for dt in desired {
        if let Some(prev_name) = rename_source(&dt.previous_name, desired, current, |t| &t.name) {
            let ct = current.iter().find(|c| c.name == prev_name).unwrap();
            consumed.insert(prev_name.clone());
            creates_and_modifies.push(DiffEntry {
                forward: vec![generate_rename("TABLE", &prev_name, &dt.name)],
                rollback: vec![generate_rename("TABLE", &dt.name, &prev_name)],
                change: Change::new(EntityKind::Table, &dt.name, Operation::Rename, "table renamed")
                    .with_previous_name(prev_name),
            });
            creates_and_modifies.extend(diff_table_contents(dt, ct, &dt.name));
        } else if let Some(ct) = current.iter().find(|c| c.name == dt.name) {
            consumed.insert(ct.name.clone());
            creates_and_modifies.extend(diff_table_contents(dt, ct, &dt.name));
        } else {
            creates_and_modifies.push(create_table_entry(dt));
        }
    }

    for ct in current {
        if !consumed.contains(&ct.name) {
            removes.push(remove_table_entry(ct));
        }
    }

    creates_and_modifies.extend(removes);
    creates_and_modifies
}

fn create_table_entry(table: &Table) -> DiffEntry {
    let mut forward = vec![generate_table(table)];
    forward.extend(table.fields.iter().map(|f| generate_field(f, &table.name)));
    forward.extend(table.indexes.iter().map(|i| generate_index(i, &table.name)));
    forward.extend(table.events.iter().map(|e| generate_event(e, &table.name, false)));
    DiffEntry {
        forward,
        rollback: vec![generate_table_remove(&table.name)],
        change: Change::new(EntityKind::Table, &table.name, Operation::Create, "table created"),
    }
}

fn remove_table_entry(table: &Table) -> DiffEntry {
    let mut rollback = vec![generate_table(table)];
    rollback.extend(table.fields.iter().map(|f| generate_field(f, &table.name)));
    rollback.extend(table.indexes.iter().map(|i| generate_index(i, &table.name)));
    rollback.extend(table.events.iter().map(|e| generate_event(e, &table.name, false)));
    DiffEntry {
        forward: vec![generate_table_remove(&table.name)],
        rollback,
        change: Change::new(EntityKind::Table, &table.name, Operation::Remove, "table removed"),
    }
}

/// Diff fields, indexes, and events of a table (or a relation's
/// non-reserved fields). Removals precede creates/modifies.
fn diff_table_contents(desired: &Table, current: &Table, table_name: &str) -> Vec<DiffEntry> {
    diff_fields_indexes_events(
        &desired.fields,
        &current.fields,
        &desired.indexes,
        &current.indexes,
        &desired.events,
        &current.events,
        table_name,
        false,
    )
}

#[allow(clippy::too_many_arguments)]
fn diff_fields_indexes_events(
    desired_fields: &[Field],
    current_fields: &[Field],
    desired_indexes: &[Index],
    current_indexes: &[Index],
    desired_events: &[drift_schema::Event],
    current_events: &[drift_schema::Event],
    table: &str,
    skip_reserved: bool,
) -> Vec<DiffEntry> {
    let (field_removes, field_rest) = diff_fields(desired_fields, current_fields, table, skip_reserved);
    let (index_removes, index_rest) = diff_indexes(desired_indexes, current_indexes, table);
    let (event_removes, event_rest) = diff_events(desired_events, current_events, table);

    let mut out = Vec::new();
    out.extend(field_removes);
    out.extend(index_removes);
    out.extend(event_removes);
    out.extend(field_rest);
    out.extend(index_rest);
    out.extend(event_rest);
    out
}

// ---------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------

fn diff_fields(
    desired: &[Field],
    current: &[Field],
    table: &str,
    skip_reserved: bool,
) -> (Vec<DiffEntry>, Vec<DiffEntry>) {
    let relevant_desired: Vec<&Field> = desired
        .iter()
        .filter(|f| !(skip_reserved && f.is_reserved_relation_field()))
        .collect();
    let relevant_current: Vec<&Field> = current
        .iter()
        .filter(|f| !(skip_reserved && f.is_reserved_relation_field()))
        .collect();

    let mut consumed: HashSet<String> = HashSet::new();
    let mut removes = Vec::new();
    let mut rest = Vec::new();

    for df in &relevant_desired {
        let rename_match = df.previous_name.as_ref().and_then(|prev| {
            prev.candidates().into_iter().find(|cand| {
                relevant_current.iter().any(|c| c.name == *cand)
                    && !relevant_desired.iter().any(|d| d.name == *cand)
            })
        });

        if let Some(prev_name) = rename_match {
            consumed.insert(prev_name.to_string());
            rest.push(DiffEntry {
                forward: vec![generate_field_rename(prev_name, &df.name, table)],
                rollback: vec![generate_field_rename(&df.name, prev_name, table)],
                change: Change::new(EntityKind::Field, &df.name, Operation::Rename, format!("on table {table}"))
                    .with_previous_name(prev_name),
            });
            let cf = relevant_current.iter().find(|c| c.name == prev_name).unwrap();
            if let Some(entry) = diff_field_modify(df, cf, table) {
                rest.push(entry);
            }
        } else if let Some(cf) = relevant_current.iter().find(|c| c.name == df.name) {
            consumed.insert(cf.name.clone());
            if let Some(entry) = diff_field_modify(df, cf, table) {
                rest.push(entry);
            }
        } else {
            rest.push(DiffEntry {
                forward: vec![generate_field(df, table)],
                rollback: vec![generate_field_remove(&df.name, table)],
                change: Change::new(EntityKind::Field, &df.name, Operation::Create, format!("on table {table}")),
            });
        }
    }

    for cf in &relevant_current {
        if consumed.contains(&cf.name) {
            continue;
        }
        // `<parent>.*` auto-fields are never emitted as removals if the
        // desired schema still declares `<parent>: array<...>`.
        if let Some(parent) = cf.array_element_parent() {
            let parent_is_array = relevant_desired
                .iter()
                .any(|d| d.name == parent && d.type_.to_lowercase().starts_with("array"));
            if parent_is_array {
                continue;
            }
        }
        removes.push(DiffEntry {
            forward: vec![generate_field_remove(&cf.name, table)],
            rollback: vec![generate_field(cf, table)],
            change: Change::new(EntityKind::Field, &cf.name, Operation::Remove, format!("on table {table}")),
        });
    }

    (removes, rest)
}

fn diff_field_modify(desired: &Field, current: &Field, table: &str) -> Option<DiffEntry> {
    let mut changed = Vec::new();
    if normalize_option_type(&desired.type_) != normalize_option_type(&current.type_) {
        changed.push(FieldProperty::Type);
    }
    if opt_expr_equal(desired.default.as_deref(), current.default.as_deref(), normalize_default) {
        // equal, no-op
    } else {
        changed.push(FieldProperty::Default);
    }
    if opt_expr_equal(desired.value.as_deref(), current.value.as_deref(), normalize_expr) {
    } else {
        changed.push(FieldProperty::Value);
    }
    if opt_expr_equal(desired.assert.as_deref(), current.assert.as_deref(), normalize_expr) {
    } else {
        changed.push(FieldProperty::Assert);
    }
    if desired.readonly != current.readonly {
        changed.push(FieldProperty::Readonly);
    }
    if normalize_comment(desired.comment.as_deref()) != normalize_comment(current.comment.as_deref()) {
        changed.push(FieldProperty::Comment);
    }

    let other_changed = desired.flexible != current.flexible
        || desired.optional != current.optional
        || normalize_permissions(desired.permissions.as_deref())
            != normalize_permissions(current.permissions.as_deref());

    if changed.is_empty() && !other_changed {
        return None;
    }

    if !other_changed && changed.len() <= 3 {
        let forward = changed.iter().map(|p| generate_alter_field(desired, table, *p)).collect();
        let rollback = changed.iter().map(|p| generate_alter_field(current, table, *p)).collect();
        let details = changed.iter().map(|p| p.keyword()).collect::<Vec<_>>().join(",");
        Some(DiffEntry {
            forward,
            rollback,
            change: Change::new(
                EntityKind::Field,
                &desired.name,
                Operation::Modify,
                format!("altered {details} on table {table}"),
            ),
        })
    } else {
        Some(DiffEntry {
            forward: vec![generate_field_overwrite(desired, table)],
            rollback: vec![generate_field_overwrite(current, table)],
            change: Change::new(
                EntityKind::Field,
                &desired.name,
                Operation::Modify,
                format!("overwritten on table {table}"),
            ),
        })
    }
}

fn opt_expr_equal(a: Option<&str>, b: Option<&str>, normalize: fn(&str) -> String) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => normalize(a) == normalize(b),
        _ => false,
    }
}

// ---------------------------------------------------------------------
// Indexes — any change forces drop-and-recreate.
// ---------------------------------------------------------------------

fn diff_indexes(desired: &[Index], current: &[Index], table: &str) -> (Vec<DiffEntry>, Vec<DiffEntry>) {
    let mut removes = Vec::new();
    let mut creates = Vec::new();
    let mut consumed = HashSet::new();

    for di in desired {
        match current.iter().find(|ci| ci.name == di.name) {
            Some(ci) if ci == di => {
                consumed.insert(ci.name.clone());
            }
            Some(ci) => {
                consumed.insert(ci.name.clone());
                removes.push(DiffEntry {
                    forward: vec![generate_index_remove(&ci.name, table)],
                    rollback: vec![generate_index(ci, table)],
                    change: Change::new(
                        EntityKind::Index,
                        &di.name,
                        Operation::Remove,
                        format!("dropped for recreate on table {table}"),
                    ),
                });
                creates.push(DiffEntry {
                    forward: vec![generate_index(di, table)],
                    rollback: vec![generate_index_remove(&di.name, table)],
                    change: Change::new(
                        EntityKind::Index,
                        &di.name,
                        Operation::Create,
                        format!("recreated on table {table}"),
                    ),
                });
            }
            None => creates.push(DiffEntry {
                forward: vec![generate_index(di, table)],
                rollback: vec![generate_index_remove(&di.name, table)],
                change: Change::new(EntityKind::Index, &di.name, Operation::Create, format!("on table {table}")),
            }),
        }
    }

    for ci in current {
        if !consumed.contains(&ci.name) {
            removes.push(DiffEntry {
                forward: vec![generate_index_remove(&ci.name, table)],
                rollback: vec![generate_index(ci, table)],
                change: Change::new(EntityKind::Index, &ci.name, Operation::Remove, format!("on table {table}")),
            });
        }
    }

    (removes, creates)
}

// ---------------------------------------------------------------------
// Events — modified via OVERWRITE.
// ---------------------------------------------------------------------

fn diff_events(
    desired: &[drift_schema::Event],
    current: &[drift_schema::Event],
    table: &str,
) -> (Vec<DiffEntry>, Vec<DiffEntry>) {
    let mut removes = Vec::new();
    let mut rest = Vec::new();
    let mut consumed = HashSet::new();

    for de in desired {
        match current.iter().find(|ce| ce.name == de.name) {
            Some(ce) => {
                consumed.insert(ce.name.clone());
                let when_equal = normalize_expr(&de.when) == normalize_expr(&ce.when);
                let then_equal = crate::normalize::normalize_then_statement(&de.then_statement)
                    == crate::normalize::normalize_then_statement(&ce.then_statement);
                if !when_equal || !then_equal {
                    rest.push(DiffEntry {
                        forward: vec![generate_event(de, table, true)],
                        rollback: vec![generate_event(ce, table, true)],
                        change: Change::new(EntityKind::Event, &de.name, Operation::Modify, format!("on table {table}")),
                    });
                }
            }
            None => rest.push(DiffEntry {
                forward: vec![generate_event(de, table, false)],
                rollback: vec![generate_event_remove(&de.name, table)],
                change: Change::new(EntityKind::Event, &de.name, Operation::Create, format!("on table {table}")),
            }),
        }
    }

    for ce in current {
        if !consumed.contains(&ce.name) {
            removes.push(DiffEntry {
                forward: vec![generate_event_remove(&ce.name, table)],
                rollback: vec![generate_event(ce, table, false)],
                change: Change::new(EntityKind::Event, &ce.name, Operation::Remove, format!("on table {table}")),
            });
        }
    }

    (removes, rest)
}

// ---------------------------------------------------------------------
// Relations — endpoint changes force a full recreate.
// ---------------------------------------------------------------------

fn diff_relations(desired: &[Relation], current: &[Relation]) -> Vec<DiffEntry> {
    let mut creates_and_modifies = Vec::new();
    let mut removes = Vec::new();
    let mut consumed: HashSet<String> = HashSet::new();

    for dr in desired {
        let rename_source = rename_source(
            &dr.table.previous_name,
            desired.iter().map(|r| &r.table).collect::<Vec<_>>().as_slice(),
            current.iter().map(|r| &r.table).collect::<Vec<_>>().as_slice(),
            |t| &t.name,
        );

        let matched_current = if let Some(prev_name) = &rename_source {
            current.iter().find(|c| c.name() == prev_name)
        } else {
            current.iter().find(|c| c.name() == dr.name())
        };

        match matched_current {
            Some(cr) => {
                consumed.insert(cr.name().to_string());
                if let Some(prev_name) = &rename_source {
                    creates_and_modifies.push(DiffEntry {
                        forward: vec![generate_rename("TABLE", prev_name, dr.name())],
                        rollback: vec![generate_rename("TABLE", dr.name(), prev_name)],
                        change: Change::new(EntityKind::Relation, dr.name(), Operation::Rename, "relation renamed")
                            .with_previous_name(prev_name.clone()),
                    });
                }

                if dr.from != cr.from || dr.to != cr.to {
                    creates_and_modifies.push(recreate_relation_entry(dr, cr));
                } else {
                    creates_and_modifies.extend(diff_fields_indexes_events(
                        &dr.table.fields,
                        &cr.table.fields,
                        &dr.table.indexes,
                        &cr.table.indexes,
                        &dr.table.events,
                        &cr.table.events,
                        dr.name(),
                        true,
                    ));
                }
            }
            None => creates_and_modifies.push(create_relation_entry(dr)),
        }
    }

    for cr in current {
        if !consumed.contains(cr.name()) {
            removes.push(remove_relation_entry(cr));
        }
    }

    creates_and_modifies.extend(removes);
    creates_and_modifies
}

fn create_relation_entry(relation: &Relation) -> DiffEntry {
    let mut forward = vec![generate_relation(relation)];
    forward.extend(relation.non_reserved_fields().into_iter().map(|f| generate_field(f, relation.name())));
    forward.extend(relation.table.indexes.iter().map(|i| generate_index(i, relation.name())));
    forward.extend(relation.table.events.iter().map(|e| generate_event(e, relation.name(), false)));
    DiffEntry {
        forward,
        rollback: vec![generate_table_remove(relation.name())],
        change: Change::new(EntityKind::Relation, relation.name(), Operation::Create, "relation created"),
    }
}

fn remove_relation_entry(relation: &Relation) -> DiffEntry {
    let mut rollback = vec![generate_relation(relation)];
    rollback.extend(relation.non_reserved_fields().into_iter().map(|f| generate_field(f, relation.name())));
    rollback.extend(relation.table.indexes.iter().map(|i| generate_index(i, relation.name())));
    rollback.extend(relation.table.events.iter().map(|e| generate_event(e, relation.name(), false)));
    DiffEntry {
        forward: vec![generate_table_remove(relation.name())],
        rollback,
        change: Change::new(EntityKind::Relation, relation.name(), Operation::Remove, "relation removed"),
    }
}

fn recreate_relation_entry(desired: &Relation, current: &Relation) -> DiffEntry {
    let mut forward = vec![generate_table_remove(desired.name()), generate_relation(desired)];
    forward.extend(desired.non_reserved_fields().into_iter().map(|f| generate_field(f, desired.name())));
    forward.extend(desired.table.indexes.iter().map(|i| generate_index(i, desired.name())));
    forward.extend(desired.table.events.iter().map(|e| generate_event(e, desired.name(), false)));

    let mut rollback = vec![generate_table_remove(current.name()), generate_relation(current)];
    rollback.extend(current.non_reserved_fields().into_iter().map(|f| generate_field(f, current.name())));
    rollback.extend(current.table.indexes.iter().map(|i| generate_index(i, current.name())));
    rollback.extend(current.table.events.iter().map(|e| generate_event(e, current.name(), false)));

    DiffEntry {
        forward,
        rollback,
        change: Change::new(
            EntityKind::Relation,
            desired.name(),
            Operation::Recreate,
            format!("endpoints changed from {}:{} to {}:{}", current.from.as_name(), current.to.as_name(), desired.from.as_name(), desired.to.as_name()),
        ),
    }
}

// ---------------------------------------------------------------------
// Functions / analyzers / scopes — modified via OVERWRITE.
// ---------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn diff_overwrite_group<T>(
    desired: &[T],
    current: &[T],
    kind: EntityKind,
    name_of: impl Fn(&T) -> String,
    equal: impl Fn(&T, &T) -> bool,
    generate_create: impl Fn(&T) -> String,
    generate_overwrite: impl Fn(&T) -> String,
    generate_remove: impl Fn(&str) -> String,
) -> Vec<DiffEntry> {
    let mut creates_and_modifies = Vec::new();
    let mut removes = Vec::new();
    let mut consumed: HashSet<String> = HashSet::new();

    for d in desired {
        let dname = name_of(d);
        match current.iter().find(|c| name_of(c) == dname) {
            Some(c) => {
                consumed.insert(dname.clone());
                if !equal(d, c) {
                    creates_and_modifies.push(DiffEntry {
                        forward: vec![generate_overwrite(d)],
                        rollback: vec![generate_overwrite(c)],
                        change: Change::new(kind, &dname, Operation::Modify, "overwritten"),
                    });
                }
            }
            None => creates_and_modifies.push(DiffEntry {
                forward: vec![generate_create(d)],
                rollback: vec![generate_remove(&dname)],
                change: Change::new(kind, &dname, Operation::Create, "created"),
            }),
        }
    }

    for c in current {
        let cname = name_of(c);
        if !consumed.contains(&cname) {
            removes.push(DiffEntry {
                forward: vec![generate_remove(&cname)],
                rollback: vec![generate_overwrite(c)],
                change: Change::new(kind, &cname, Operation::Remove, "removed"),
            });
        }
    }

    creates_and_modifies.extend(removes);
    creates_and_modifies
}

fn functions_equal(a: &Function, b: &Function) -> bool {
    if a.parameters.len() != b.parameters.len() {
        return false;
    }
    let params_equal = a
        .parameters
        .iter()
        .zip(&b.parameters)
        .all(|(x, y)| x.name == y.name && normalize_option_type(&x.type_) == normalize_option_type(&y.type_));
    let returns_equal = match (&a.return_type, &b.return_type) {
        (None, None) => true,
        (Some(x), Some(y)) => normalize_option_type(x) == normalize_option_type(y),
        _ => false,
    };
    params_equal && returns_equal && crate::normalize::normalize_function_body(&a.body) == crate::normalize::normalize_function_body(&b.body)
}

fn analyzers_equal(a: &Analyzer, b: &Analyzer) -> bool {
    sorted_uppercase(&a.tokenizers) == sorted_uppercase(&b.tokenizers)
        && sorted_uppercase(&a.filters) == sorted_uppercase(&b.filters)
}

fn sorted_uppercase(items: &[String]) -> Vec<String> {
    let mut v: Vec<String> = items.iter().map(|s| s.to_uppercase()).collect();
    v.sort();
    v
}

fn scopes_equal(a: &Scope, b: &Scope) -> bool {
    let session_equal = match (a.session.as_deref(), b.session.as_deref()) {
        (None, None) => true,
        (Some(x), Some(y)) => duration_to_days(x) == duration_to_days(y),
        _ => false,
    };
    session_equal
        && opt_expr_equal(a.signup.as_deref(), b.signup.as_deref(), normalize_expr)
        && opt_expr_equal(a.signin.as_deref(), b.signin.as_deref(), normalize_expr)
}

// ---------------------------------------------------------------------
// Params — modified via granular ALTER, not overwrite.
// ---------------------------------------------------------------------

fn diff_params(desired: &[Param], current: &[Param]) -> Vec<DiffEntry> {
    let mut creates_and_modifies = Vec::new();
    let mut removes = Vec::new();
    let mut consumed = HashSet::new();

    for d in desired {
        match current.iter().find(|c| c.name == d.name) {
            Some(c) => {
                consumed.insert(c.name.clone());
                if normalize_expr(&d.value) != normalize_expr(&c.value) {
                    creates_and_modifies.push(DiffEntry {
                        forward: vec![generate_alter_param(d)],
                        rollback: vec![generate_alter_param(c)],
                        change: Change::new(EntityKind::Param, &d.name, Operation::Modify, "value altered"),
                    });
                }
            }
            None => creates_and_modifies.push(DiffEntry {
                forward: vec![generate_param(d)],
                rollback: vec![generate_param_remove(&d.name)],
                change: Change::new(EntityKind::Param, &d.name, Operation::Create, "created"),
            }),
        }
    }

    for c in current {
        if !consumed.contains(&c.name) {
            removes.push(DiffEntry {
                forward: vec![generate_param_remove(&c.name)],
                rollback: vec![generate_param(c)],
                change: Change::new(EntityKind::Param, &c.name, Operation::Remove, "removed"),
            });
        }
    }

    creates_and_modifies.extend(removes);
    creates_and_modifies
}

// ---------------------------------------------------------------------
// Sequences — never modified in place; any difference is drop+create
//.
// ---------------------------------------------------------------------

fn diff_sequences(desired: &[Sequence], current: &[Sequence]) -> Vec<DiffEntry> {
    let mut creates_and_modifies = Vec::new();
    let mut removes = Vec::new();
    let mut consumed = HashSet::new();

    for d in desired {
        match current.iter().find(|c| c.name == d.name) {
            Some(c) if c.start == d.start => {
                consumed.insert(c.name.clone());
            }
            Some(c) => {
                consumed.insert(c.name.clone());
                creates_and_modifies.push(DiffEntry {
                    forward: vec![generate_sequence_remove(&d.name), generate_sequence(d)],
                    rollback: vec![generate_sequence_remove(&d.name), generate_sequence(c)],
                    change: Change::new(EntityKind::Sequence, &d.name, Operation::Recreate, "start value changed"),
                });
            }
            None => creates_and_modifies.push(DiffEntry {
                forward: vec![generate_sequence(d)],
                rollback: vec![generate_sequence_remove(&d.name)],
                change: Change::new(EntityKind::Sequence, &d.name, Operation::Create, "created"),
            }),
        }
    }

    for c in current {
        if !consumed.contains(&c.name) {
            removes.push(DiffEntry {
                forward: vec![generate_sequence_remove(&c.name)],
                rollback: vec![generate_sequence(c)],
                change: Change::new(EntityKind::Sequence, &c.name, Operation::Remove, "removed"),
            });
        }
    }

    creates_and_modifies.extend(removes);
    creates_and_modifies
}

// ---------------------------------------------------------------------
// Shared rename-detection helper.
// ---------------------------------------------------------------------

/// If `previous_name` names a current entity that no desired entity
/// still claims by that name, return it as the rename source.
fn rename_source<T>(
    previous_name: &Option<String>,
    desired: &[T],
    current: &[T],
    name_of: impl Fn(&T) -> &String,
) -> Option<String> {
    let prev = previous_name.as_ref()?;
    let exists_in_current = current.iter().any(|c| name_of(c) == prev);
    let still_claimed_by_desired = desired.iter().any(|d| name_of(d) == prev);
    if exists_in_current && !still_claimed_by_desired {
        Some(prev.clone())
    } else {
        None
    }
}

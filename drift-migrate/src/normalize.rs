//! Semantic normalization of definition-language fragments.
//!
//! Two fragments are semantically equal iff they differ only by
//! transformations this module considers irrelevant. Every rewrite here
//! is idempotent; `normalize_expr(normalize_expr(s)) == normalize_expr(s)`
//! for all `s`, which is what makes fixed-point parenthesis removal safe
//! to run to convergence rather than a single pass.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static BACKTICKED_NAMESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([A-Za-z_][A-Za-z0-9_]*)`::").unwrap());
static DURATION_WEEKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(\d+)w$").unwrap());
static DURATION_DAYS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(\d+)d$").unwrap());
static DURATION_HOURS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(\d+)h$").unwrap());
static OPTION_LEFT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^none\s*\|\s*(.+)$").unwrap());
static OPTION_RIGHT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(.+?)\s*\|\s*none$").unwrap());
static DEFAULT_SINGLE_QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(DEFAULT\s+)'([^']*)'").unwrap());
static DEFAULT_DOUBLE_QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(DEFAULT\s+)"([^"]*)""#).unwrap());
static FOR_DELETE_CLAUSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)FOR\s+delete\s+[^,]*,?").unwrap());
static FOR_KEYWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bFOR\b").unwrap());

/// Collapse whitespace runs to a single space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// `none | T` and `T | none` both collapse to `option<T>`; an existing
/// `option<T>` passes through unchanged.
pub fn normalize_option_type(s: &str) -> String {
    let s = s.trim();
    if let Some(caps) = OPTION_LEFT.captures(s) {
        return format!("option<{}>", caps[1].trim());
    }
    if let Some(caps) = OPTION_RIGHT.captures(s) {
        return format!("option<{}>", caps[1].trim());
    }
    s.to_string()
}

/// Convert a duration literal to whole days, for comparing scope session
/// durations (`Nw` => `N*7` days; `Nd` passes through; `Nh` truncates
/// toward zero days).
pub fn duration_to_days(s: &str) -> Option<u64> {
    let s = s.trim();
    if let Some(caps) = DURATION_WEEKS.captures(s) {
        return caps[1].parse::<u64>().ok().map(|n| n * 7);
    }
    if let Some(caps) = DURATION_DAYS.captures(s) {
        return caps[1].parse::<u64>().ok();
    }
    if let Some(caps) = DURATION_HOURS.captures(s) {
        return caps[1].parse::<u64>().ok().map(|n| n / 24);
    }
    None
}

/// Rewrite `Nw` duration literals embedded in a larger fragment to their
/// day equivalent, e.g. `DURATION FOR SESSION 2w` => `DURATION FOR SESSION
/// 14d`.
pub fn normalize_duration_literals(s: &str) -> String {
    static INLINE_WEEKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d+)w\b").unwrap());
    INLINE_WEEKS
        .replace_all(s, |caps: &regex_lite::Captures| {
            let n: u64 = caps[1].parse().unwrap_or(0);
            format!("{}d", n * 7)
        })
        .into_owned()
}

/// Strip matching outer quotes around a `DEFAULT` literal.
fn strip_default_quotes(s: &str) -> String {
    let s = DEFAULT_SINGLE_QUOTED.replace_all(s, "$1$2");
    DEFAULT_DOUBLE_QUOTED.replace_all(&s, "$1$2").into_owned()
}

/// `` `rand`::x `` => `rand::x`.
fn normalize_backticked_namespace(s: &str) -> String {
    BACKTICKED_NAMESPACE.replace_all(s, "$1::").into_owned()
}

/// Normalize quote style inside bracketed literals: `["a"]` => `['a']`.
pub fn normalize_bracket_quotes(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut depth = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            '[' => {
                depth += 1;
                out.push(c);
            }
            ']' => {
                depth = depth.saturating_sub(1);
                out.push(c);
            }
            '"' if depth > 0 => out.push('\''),
            _ => out.push(c),
        }
        i += 1;
    }
    out
}

/// Canonicalize a `PERMISSIONS` clause: empty/absent/`FULL` all collapse
/// to `FULL`; the deprecated `FOR delete` sub-clause is stripped; the
/// clause is then re-split on each top-level `FOR` keyword and rejoined
/// with exactly one `, ` between clauses, so that a comma-separated and a
/// bare-whitespace-separated list of the same `FOR` clauses normalize to
/// the same string.
pub fn normalize_permissions(clause: Option<&str>) -> String {
    let raw = clause.unwrap_or("").trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("full") || raw.eq_ignore_ascii_case("none") {
        return "FULL".to_string();
    }
    let without_delete = FOR_DELETE_CLAUSE.replace_all(raw, "");
    let starts: Vec<usize> = FOR_KEYWORD.find_iter(&without_delete).map(|m| m.start()).collect();
    if starts.is_empty() {
        let trimmed = without_delete.trim().trim_matches(',').trim();
        return if trimmed.is_empty() {
            "FULL".to_string()
        } else {
            collapse_whitespace(trimmed)
        };
    }
    let segments: Vec<String> = starts
        .iter()
        .enumerate()
        .filter_map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(without_delete.len());
            let seg = without_delete[start..end].trim().trim_end_matches(',').trim();
            if seg.is_empty() {
                None
            } else {
                Some(collapse_whitespace(seg))
            }
        })
        .collect();
    if segments.is_empty() {
        "FULL".to_string()
    } else {
        segments.join(", ")
    }
}

/// Fixed-point removal of a redundant single enclosing pair of
/// parentheses: `(<string> $value)` => `<string> $value`, `($a AND $b)`
/// => `$a AND $b`. Runs until no further enclosing pair is redundant.
pub fn strip_redundant_parens(s: &str) -> String {
    let mut current = s.trim().to_string();
    loop {
        let next = strip_one_enclosing_paren(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_one_enclosing_paren(s: &str) -> String {
    let trimmed = s.trim();
    let bytes = trimmed.as_bytes();
    if bytes.first() != Some(&b'(') || bytes.last() != Some(&b')') {
        return trimmed.to_string();
    }
    let mut depth = 0i32;
    for (i, b) in bytes.iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 && i != bytes.len() - 1 {
                    // the opening paren closes before the end: not a single
                    // enclosing pair around the whole expression.
                    return trimmed.to_string();
                }
            }
            _ => {}
        }
    }
    trimmed[1..trimmed.len() - 1].trim().to_string()
}

/// The general-purpose expression normalizer used for `assert`, `value`,
/// and function-body fragments: whitespace collapse, backticked-namespace
/// rewrite, bracket quote-style normalization, then fixed-point paren
/// removal.
pub fn normalize_expr(s: &str) -> String {
    let s = collapse_whitespace(s);
    let s = normalize_backticked_namespace(&s);
    let s = normalize_bracket_quotes(&s);
    strip_redundant_parens(&s)
}

/// Normalize a `DEFAULT` expression: quote-stripping plus the general
/// expression pipeline.
pub fn normalize_default(s: &str) -> String {
    normalize_expr(&strip_default_quotes(s))
}

/// A `COMMENT` value: `null`, `undefined`, empty, and missing are all
/// equivalent to "no comment".
pub fn normalize_comment(comment: Option<&str>) -> Option<String> {
    match comment.map(str::trim) {
        None => None,
        Some("") => None,
        Some("null") => None,
        Some("undefined") => None,
        Some(other) => Some(other.to_string()),
    }
}

/// An `EVENT ... THEN` statement: preserved if already a `{ ... }` block;
/// otherwise wrapped in one when it contains `;` or a `FOR`/`IF`/`LET`
/// keyword, since those require statement-block syntax.
pub fn normalize_then_statement(s: &str) -> String {
    let s = collapse_whitespace(s);
    if s.starts_with('{') && s.ends_with('}') {
        return s;
    }
    let needs_block = s.contains(';')
        || contains_keyword(&s, "FOR")
        || contains_keyword(&s, "IF")
        || contains_keyword(&s, "LET");
    if needs_block {
        format!("{{ {s} }}")
    } else {
        s
    }
}

fn contains_keyword(s: &str, keyword: &str) -> bool {
    s.split(|c: char| !c.is_alphanumeric() && c != '_')
        .any(|word| word.eq_ignore_ascii_case(keyword))
}

/// A function body: whitespace-normalized, trailing `;` stripped, parens
/// around arithmetic sub-expressions reduced to a fixed point.
pub fn normalize_function_body(s: &str) -> String {
    let s = collapse_whitespace(s);
    let s = s.strip_suffix(';').unwrap_or(&s).trim().to_string();
    strip_redundant_parens(&s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_collapses() {
        assert_eq!(collapse_whitespace("  a   b\tc\n"), "a b c");
    }

    #[test]
    fn option_type_collapses_both_orders() {
        assert_eq!(normalize_option_type("none | string"), "option<string>");
        assert_eq!(normalize_option_type("string | none"), "option<string>");
        assert_eq!(normalize_option_type("option<string>"), "option<string>");
    }

    #[test]
    fn duration_weeks_converts_to_days() {
        assert_eq!(duration_to_days("2w"), Some(14));
        assert_eq!(duration_to_days("14d"), Some(14));
    }

    #[test]
    fn backticked_namespace_normalizes() {
        assert_eq!(normalize_expr("`rand`::uuid()"), "rand::uuid()");
    }

    #[test]
    fn bracket_quote_style_normalizes() {
        assert_eq!(normalize_bracket_quotes(r#"["a", "b"]"#), "['a', 'b']");
        assert_eq!(normalize_bracket_quotes(r#"COMMENT "x""#), r#"COMMENT "x""#);
    }

    #[test]
    fn permissions_collapse_full_variants() {
        assert_eq!(normalize_permissions(None), "FULL");
        assert_eq!(normalize_permissions(Some("")), "FULL");
        assert_eq!(normalize_permissions(Some("FULL")), "FULL");
        assert_eq!(normalize_permissions(Some("full")), "FULL");
    }

    #[test]
    fn permissions_strip_deprecated_delete_clause() {
        let normalized =
            normalize_permissions(Some("FOR select FULL, FOR delete NONE, FOR create FULL"));
        assert!(!normalized.to_lowercase().contains("delete"));
    }

    #[test]
    fn permissions_with_and_without_commas_are_equivalent() {
        let with_commas = normalize_permissions(Some("FOR select FULL, FOR create FULL"));
        let without_commas = normalize_permissions(Some("FOR select FULL FOR create FULL"));
        assert_eq!(with_commas, without_commas);
    }

    #[test]
    fn redundant_parens_are_removed_to_fixed_point() {
        assert_eq!(strip_redundant_parens("($value > 0)"), "$value > 0");
        assert_eq!(strip_redundant_parens("(($value > 0))"), "$value > 0");
        assert_eq!(
            strip_redundant_parens("($a > 0) AND ($b > 0)"),
            "($a > 0) AND ($b > 0)"
        );
    }

    #[test]
    fn comment_null_equivalents_collapse_to_none() {
        assert_eq!(normalize_comment(None), None);
        assert_eq!(normalize_comment(Some("")), None);
        assert_eq!(normalize_comment(Some("null")), None);
        assert_eq!(normalize_comment(Some("undefined")), None);
        assert_eq!(
            normalize_comment(Some("primary contact")),
            Some("primary contact".to_string())
        );
    }

    #[test]
    fn then_statement_wraps_when_needed() {
        assert_eq!(normalize_then_statement("{ UPDATE x SET y = 1; }"), "{ UPDATE x SET y = 1; }");
        assert_eq!(
            normalize_then_statement("UPDATE x SET y = 1; UPDATE z SET w = 2;"),
            "{ UPDATE x SET y = 1; UPDATE z SET w = 2; }"
        );
        assert_eq!(normalize_then_statement("$value.count > 0"), "$value.count > 0");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_expr("(( `rand`::uuid() ))");
        let twice = normalize_expr(&once);
        assert_eq!(once, twice);
    }
}

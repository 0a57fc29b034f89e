//! Fuzz target for the semantic normalizer.
//!
//! Normalization must be idempotent —
//! `normalize(normalize(x)) == normalize(x)`. This target checks that
//! property across every normalizer entry point and ensures none of them
//! panic on arbitrary input.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_normalizer
//! ```

#![no_main]

use drift_migrate::normalize::{
    normalize_bracket_quotes, normalize_duration_literals, normalize_expr, normalize_function_body,
    normalize_option_type, normalize_permissions, normalize_then_statement, strip_redundant_parens,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let once = normalize_expr(input);
    let twice = normalize_expr(&once);
    assert_eq!(once, twice, "normalize_expr is not idempotent for {input:?}");

    let once = normalize_option_type(input);
    assert_eq!(once, normalize_option_type(&once));

    let once = normalize_duration_literals(input);
    assert_eq!(once, normalize_duration_literals(&once));

    let once = normalize_bracket_quotes(input);
    assert_eq!(once, normalize_bracket_quotes(&once));

    let once = strip_redundant_parens(input);
    assert_eq!(once, strip_redundant_parens(&once));

    let once = normalize_then_statement(input);
    assert_eq!(once, normalize_then_statement(&once));

    let once = normalize_function_body(input);
    assert_eq!(once, normalize_function_body(&once));

    let once = normalize_permissions(Some(input));
    assert_eq!(once, normalize_permissions(Some(&once)));
});

//! End-to-end tests for the expression engine's public API.
//!
//! These tests exercise the full pipeline the way a check implementation
//! does: parse user-supplied `filter=`/`warn=`/`crit=` text, optionally
//! rewrite aliases, match the result against data rows, and synthesize
//! threshold range strings for performance data.

use std::collections::HashMap;

use checkexpr_rs::{
    format_number, threshold_string, AliasConfig, Condition, ConditionList, ExpressionParser,
    MatchResult, ParseOptions,
};

fn row(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn parse(expression: &str) -> Condition {
    ExpressionParser::parse(expression).expect("expression should parse")
}

// ============================================================================
// Filter Matching
// ============================================================================

#[test]
fn test_e2e_process_filter() {
    let condition = parse("name like 'chrome' and cpu > 50%");
    let busy = row(&[("name", "chrome.exe"), ("cpu", "93")]);
    let idle = row(&[("name", "chrome.exe"), ("cpu", "2")]);
    let other = row(&[("name", "sshd"), ("cpu", "99")]);

    assert_eq!(condition.matches(&busy), MatchResult::certain(true));
    assert_eq!(condition.matches(&idle), MatchResult::certain(false));
    assert_eq!(condition.matches(&other), MatchResult::certain(false));
}

#[test]
fn test_e2e_service_filter_with_list() {
    let condition = parse("state not in ('running', 'static') or start_type = disabled");
    let stopped = row(&[("state", "stopped"), ("start_type", "auto")]);
    let running = row(&[("state", "running"), ("start_type", "auto")]);

    assert_eq!(condition.matches(&stopped), MatchResult::certain(true));
    assert_eq!(condition.matches(&running), MatchResult::certain(false));
}

#[test]
fn test_e2e_disk_threshold_with_units() {
    let warn = parse("free < 5GB");
    let low = row(&[("free", "4000000000")]);
    let ok = row(&[("free", "250000000000")]);

    assert_eq!(warn.matches(&low), MatchResult::certain(true));
    assert_eq!(warn.matches(&ok), MatchResult::certain(false));
}

#[test]
fn test_e2e_uptime_duration_units() {
    let crit = parse("uptime < 2h");
    assert_eq!(
        crit.matches(&row(&[("uptime", "600")])),
        MatchResult::certain(true)
    );
    assert_eq!(
        crit.matches(&row(&[("uptime", "86400")])),
        MatchResult::certain(false)
    );
}

#[test]
fn test_e2e_case_sensitivity_matrix() {
    let data = row(&[("test", "blah")]);
    assert!(parse("test like 'Blah'").matches(&data).matched);
    assert!(!parse("test slike 'Blah'").matches(&data).matched);
    assert!(parse("test slike 'blah'").matches(&data).matched);
}

#[test]
fn test_e2e_none_filter_matches_all_rows() {
    let condition = parse("none");
    assert_eq!(condition.matches(&row(&[])), MatchResult::certain(true));
    assert_eq!(
        condition.matches(&row(&[("a", "1"), ("b", "2")])),
        MatchResult::certain(true)
    );
}

// ============================================================================
// Three-Valued Logic
// ============================================================================

#[test]
fn test_e2e_indeterminate_propagation() {
    let data = row(&[("test", "blah")]);

    let result = parse("unknown unlike blah or test like blah").matches(&data);
    assert!(result.matched);
    assert!(result.certain);

    let result = parse("unknown like blah and test unlike blah").matches(&data);
    assert!(!result.matched);
    assert!(result.certain);

    let result = parse("unknown unlike blah and test like blah").matches(&data);
    assert!(!result.matched);
    assert!(!result.certain);
}

#[test]
fn test_e2e_precheck_then_final_pass() {
    // An optimistic pre-check over a partially populated row treats
    // indeterminate as acceptable; the final pass requires certainty.
    let condition = parse("size > 1mb and age > 5m");

    let partial = row(&[("size", "5000000")]);
    let precheck = condition.matches(&partial);
    assert!(!precheck.certain, "age is not known yet");

    let keywords = condition.keywords();
    assert_eq!(keywords, vec!["size", "age"]);

    let complete = row(&[("size", "5000000"), ("age", "900")]);
    assert_eq!(condition.matches(&complete), MatchResult::certain(true));
}

// ============================================================================
// Condition Lists
// ============================================================================

#[test]
fn test_e2e_repeated_filter_arguments_combine_with_or() {
    let filters = ConditionList::parse_all(
        ["state = stopped", "start_type = disabled"],
        &ParseOptions::new(),
    )
    .unwrap();

    let stopped = row(&[("state", "stopped"), ("start_type", "auto")]);
    let disabled = row(&[("state", "running"), ("start_type", "disabled")]);
    let healthy = row(&[("state", "running"), ("start_type", "auto")]);

    assert_eq!(filters.matches(&stopped), MatchResult::certain(true));
    assert_eq!(filters.matches(&disabled), MatchResult::certain(true));
    assert_eq!(filters.matches(&healthy), MatchResult::certain(false));
}

#[test]
fn test_e2e_empty_filter_list_matches_everything() {
    let filters = ConditionList::new();
    assert_eq!(
        filters.matches(&row(&[("anything", "x")])),
        MatchResult::certain(true)
    );
}

// ============================================================================
// Alias Rewriting
// ============================================================================

#[test]
fn test_e2e_column_alias_polarity() {
    let options = ParseOptions::new()
        .with_aliases(AliasConfig::new().with_column_alias("name", ["name", "display"]));

    // Inclusive test: any aliased keyword may match.
    let inclusive = ExpressionParser::parse_with("name = 'xinetd'", &options).unwrap();
    let by_display = row(&[("name", "xinetd-unit"), ("display", "xinetd")]);
    assert_eq!(inclusive.matches(&by_display), MatchResult::certain(true));

    // Exclusive test: every aliased keyword must pass.
    let exclusive = ExpressionParser::parse_with("name unlike 'other'", &options).unwrap();
    let tainted = row(&[("name", "fine"), ("display", "other things")]);
    let clean = row(&[("name", "fine"), ("display", "also fine")]);
    assert_eq!(exclusive.matches(&tainted), MatchResult::certain(false));
    assert_eq!(exclusive.matches(&clean), MatchResult::certain(true));
}

#[test]
fn test_e2e_value_alias_for_legacy_state_names() {
    let options = ParseOptions::new()
        .with_aliases(AliasConfig::new().with_value_alias("state", "started", "running"));
    let condition = ExpressionParser::parse_with("state = started", &options).unwrap();

    assert_eq!(
        condition.matches(&row(&[("state", "running")])),
        MatchResult::certain(true)
    );
    assert_eq!(condition.to_string(), "state = running");
}

// ============================================================================
// Threshold Synthesis
// ============================================================================

#[test]
fn test_e2e_threshold_range_strings() {
    let options = ParseOptions::new();

    let warn = ConditionList::parse_all(["test > 10 and test < 20"], &options).unwrap();
    assert_eq!(threshold_string("test", &warn, format_number), "@10:20");

    let crit = ConditionList::parse_all(["test > 5 or test < 3"], &options).unwrap();
    assert_eq!(threshold_string("test", &crit, format_number), "3:5");

    let simple = ConditionList::parse_all(["test > 90"], &options).unwrap();
    assert_eq!(threshold_string("test", &simple, format_number), "90");
}

#[test]
fn test_e2e_threshold_with_units_and_formatter() {
    let warn = ConditionList::parse_all(["used > 1.5gb"], &ParseOptions::new()).unwrap();
    assert_eq!(threshold_string("used", &warn, format_number), "1500000000");
    assert_eq!(
        threshold_string("used", &warn, |v| format!("{}", v / 1_000_000_000.0)),
        "1.5"
    );
}

// ============================================================================
// Parse Failures Surface as Errors
// ============================================================================

#[test]
fn test_e2e_configuration_errors_are_reported() {
    // Ambiguous mixing must be rejected, not guessed at.
    assert!(ExpressionParser::parse("a > 1 and b > 1 or c > 1").is_err());
    assert!(ExpressionParser::parse("(a > 1 and b > 1) or c > 1").is_ok());

    // Malformed expressions abort parsing with a diagnostic.
    let err = ExpressionParser::parse("load > ").unwrap_err();
    assert!(err.to_string().contains("missing value"));

    let err = ExpressionParser::parse("state in ()").unwrap_err();
    assert!(err.to_string().contains("empty list"));
}

#[test]
fn test_e2e_str_literal_protects_irregular_text() {
    // Macro-expanded text with quotes and brackets embeds safely.
    let condition = parse("command = str(run.sh -m 'fast' (retry))");
    let data = row(&[("command", "run.sh -m 'fast' (retry)")]);
    assert_eq!(condition.matches(&data), MatchResult::certain(true));
}

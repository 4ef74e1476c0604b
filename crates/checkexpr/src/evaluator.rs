//! Three-valued condition evaluation against row data.
//!
//! Every leaf and group evaluates to a pair of booleans: whether the
//! condition matched, and whether that answer is *certain*. A leaf whose
//! keyword is absent from the row is indeterminate — the default of
//! `false` must not be read as a confirmed failure. Groups combine
//! children with Kleene three-valued AND/OR, so callers can run an
//! early optimistic pass over partially populated rows before an
//! authoritative pass once all attributes are known.

use std::collections::HashMap;

use crate::ast::{Condition, ConditionList, Group, GroupOperator, Leaf, Value};
use crate::operator::Operator;

/// The outcome of matching a condition against a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    /// Whether the condition matched the row.
    pub matched: bool,
    /// Whether the answer is conclusive. False means the row lacked the
    /// data needed to evaluate some required leaf.
    pub certain: bool,
}

impl MatchResult {
    /// Creates a result with explicit certainty.
    pub const fn new(matched: bool, certain: bool) -> Self {
        Self { matched, certain }
    }

    /// Creates a conclusive result.
    pub const fn certain(matched: bool) -> Self {
        Self {
            matched,
            certain: true,
        }
    }

    /// The indeterminate result: not matched, not certain.
    pub const fn indeterminate() -> Self {
        Self {
            matched: false,
            certain: false,
        }
    }
}

impl Condition {
    /// Evaluates this condition against a row (a mapping from attribute
    /// name to string value).
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use checkexpr_rs::ExpressionParser;
    ///
    /// let condition = ExpressionParser::parse("state = running").unwrap();
    /// let row = HashMap::from([("state".to_string(), "running".to_string())]);
    /// let result = condition.matches(&row);
    /// assert!(result.matched);
    /// assert!(result.certain);
    /// ```
    pub fn matches(&self, row: &HashMap<String, String>) -> MatchResult {
        match self {
            Condition::None => MatchResult::certain(true),
            Condition::Leaf(leaf) => eval_leaf(leaf, row),
            Condition::Group(group) => eval_group(group, row),
        }
    }
}

impl ConditionList {
    /// Evaluates the list against a row: members combine with OR
    /// semantics, and an empty list matches every row.
    pub fn matches(&self, row: &HashMap<String, String>) -> MatchResult {
        if self.is_empty() {
            return MatchResult::certain(true);
        }
        let mut all_refuted = true;
        for condition in self {
            let result = condition.matches(row);
            if result.certain && result.matched {
                return MatchResult::certain(true);
            }
            if !result.certain {
                all_refuted = false;
            }
        }
        if all_refuted {
            MatchResult::certain(false)
        } else {
            MatchResult::indeterminate()
        }
    }
}

fn eval_leaf(leaf: &Leaf, row: &HashMap<String, String>) -> MatchResult {
    let Some(actual) = row.get(&leaf.keyword) else {
        return MatchResult::indeterminate();
    };

    let matched = match (leaf.operator, &leaf.value) {
        (Operator::Equal, Value::Text(expected)) => values_equal(actual, expected),
        (Operator::Unequal, Value::Text(expected)) => !values_equal(actual, expected),
        (Operator::Contains, Value::Text(expected)) => contains_nocase(actual, expected),
        (Operator::ContainsStrict, Value::Text(expected)) => actual.contains(expected.as_str()),
        (Operator::ContainsNot, Value::Text(expected)) => !contains_nocase(actual, expected),
        (Operator::RegexMatch | Operator::RegexMatchNoCase, _) => {
            leaf.pattern.as_ref().is_some_and(|p| p.is_match(actual))
        }
        (Operator::RegexMatchNot | Operator::RegexMatchNoCaseNot, _) => {
            !leaf.pattern.as_ref().is_some_and(|p| p.is_match(actual))
        }
        (Operator::Lower, Value::Text(expected)) => numeric_cmp(actual, expected, |a, b| a < b),
        (Operator::LowerEqual, Value::Text(expected)) => {
            numeric_cmp(actual, expected, |a, b| a <= b)
        }
        (Operator::Greater, Value::Text(expected)) => numeric_cmp(actual, expected, |a, b| a > b),
        (Operator::GreaterEqual, Value::Text(expected)) => {
            numeric_cmp(actual, expected, |a, b| a >= b)
        }
        (Operator::InList, Value::List(entries)) => entries.iter().any(|entry| entry == actual),
        (Operator::NotInList, Value::List(entries)) => {
            !entries.iter().any(|entry| entry == actual)
        }
        // Operator/value combinations the parser never constructs.
        _ => false,
    };
    MatchResult::certain(matched)
}

fn eval_group(group: &Group, row: &HashMap<String, String>) -> MatchResult {
    match group.operator {
        GroupOperator::And => {
            let mut all_confirmed = true;
            for child in &group.children {
                let result = child.matches(row);
                // A confirmed mismatch disproves the whole group, even
                // when other children are indeterminate.
                if result.certain && !result.matched {
                    return MatchResult::certain(false);
                }
                if !result.certain {
                    all_confirmed = false;
                }
            }
            if all_confirmed {
                MatchResult::certain(true)
            } else {
                MatchResult::indeterminate()
            }
        }
        GroupOperator::Or => {
            let mut all_refuted = true;
            for child in &group.children {
                let result = child.matches(row);
                if result.certain && result.matched {
                    return MatchResult::certain(true);
                }
                if !result.certain {
                    all_refuted = false;
                }
            }
            if all_refuted {
                MatchResult::certain(false)
            } else {
                MatchResult::indeterminate()
            }
        }
    }
}

/// Equality compares numerically when both sides parse as numbers,
/// otherwise as raw strings.
fn values_equal(actual: &str, expected: &str) -> bool {
    match (actual.parse::<f64>(), expected.parse::<f64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => actual == expected,
    }
}

fn contains_nocase(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Ordering operators always compare numerically; an unparsable side
/// yields a determinate non-match rather than an error.
fn numeric_cmp(actual: &str, expected: &str, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (actual.parse::<f64>(), expected.parse::<f64>()) {
        (Ok(a), Ok(b)) => cmp(a, b),
        _ => false,
    }
}

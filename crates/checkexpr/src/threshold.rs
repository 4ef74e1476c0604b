//! Threshold-range synthesis.
//!
//! Reconstructs the canonical plugin performance-data range string from
//! the conditions that reference one metric with numeric comparison
//! operators:
//!
//! - a single one-sided bound (`> n` or `< n`) yields `"n"`;
//! - two bounds combined by OR describing the complement of an interval
//!   (`> hi` or `< lo`) yield `"lo:hi"` (alert outside the interval);
//! - two bounds combined by AND describing an interval (`> lo` and
//!   `< hi`) yield `"@lo:hi"` (alert inside the interval).
//!
//! Unrecognized combinations fall back to the best available one-sided
//! approximation rather than failing.

use crate::ast::{Condition, ConditionList, GroupOperator};
use crate::operator::Operator;

/// One numeric bound extracted from a leaf condition.
#[derive(Debug, Clone, Copy)]
struct Bound {
    operator: Operator,
    value: f64,
}

impl Bound {
    fn is_upper_test(&self) -> bool {
        matches!(self.operator, Operator::Greater | Operator::GreaterEqual)
    }

    fn is_lower_test(&self) -> bool {
        matches!(self.operator, Operator::Lower | Operator::LowerEqual)
    }
}

/// Synthesizes the plugin threshold range string for `metric` from the
/// given conditions. `format` renders each bound value; pass
/// [`crate::format_number`] for the canonical form.
///
/// Returns an empty string when no condition references the metric with
/// a numeric ordering operator.
///
/// # Example
///
/// ```
/// use checkexpr_rs::{format_number, threshold_string, ConditionList, ParseOptions};
///
/// let warn = ConditionList::parse_all(["test > 10 and test < 20"], &ParseOptions::new()).unwrap();
/// assert_eq!(threshold_string("test", &warn, format_number), "@10:20");
///
/// let crit = ConditionList::parse_all(["test > 5 or test < 3"], &ParseOptions::new()).unwrap();
/// assert_eq!(threshold_string("test", &crit, format_number), "3:5");
/// ```
pub fn threshold_string(
    metric: &str,
    conditions: &ConditionList,
    format: impl Fn(f64) -> String,
) -> String {
    let mut bounds = Vec::new();
    // Independently supplied clauses combine with OR when matched, so
    // bounds spread over several members count as OR-combined.
    let mut combine = if conditions.len() > 1 {
        Some(GroupOperator::Or)
    } else {
        None
    };
    for condition in conditions {
        collect_bounds(condition, metric, &mut bounds, &mut combine);
    }

    match (bounds.as_slice(), combine) {
        ([], _) => String::new(),
        ([only], _) => format(only.value),
        ([a, b], Some(GroupOperator::Or)) => {
            // `> hi or < lo`: alert outside lo:hi.
            let lo = [a, b].into_iter().find(|bound| bound.is_lower_test());
            let hi = [a, b].into_iter().find(|bound| bound.is_upper_test());
            match (lo, hi) {
                (Some(lo), Some(hi)) if lo.value <= hi.value => {
                    format!("{}:{}", format(lo.value), format(hi.value))
                }
                _ => format(a.value),
            }
        }
        ([a, b], Some(GroupOperator::And)) => {
            // `> lo and < hi`: alert inside lo:hi.
            let lo = [a, b].into_iter().find(|bound| bound.is_upper_test());
            let hi = [a, b].into_iter().find(|bound| bound.is_lower_test());
            match (lo, hi) {
                (Some(lo), Some(hi)) if lo.value <= hi.value => {
                    format!("@{}:{}", format(lo.value), format(hi.value))
                }
                _ => format(a.value),
            }
        }
        (bounds, _) => format(bounds[0].value),
    }
}

fn collect_bounds(
    condition: &Condition,
    metric: &str,
    bounds: &mut Vec<Bound>,
    combine: &mut Option<GroupOperator>,
) {
    match condition {
        Condition::None => {}
        Condition::Leaf(leaf) => {
            if leaf.keyword != metric || !leaf.operator.is_ordering() {
                return;
            }
            let Some(text) = leaf.value.as_text() else {
                return;
            };
            let Ok(value) = text.parse::<f64>() else {
                return;
            };
            bounds.push(Bound {
                operator: leaf.operator,
                value,
            });
        }
        Condition::Group(group) => {
            if combine.is_none() {
                *combine = Some(group.operator);
            }
            for child in &group.children {
                collect_bounds(child, metric, bounds, combine);
            }
        }
    }
}

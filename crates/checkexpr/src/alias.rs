//! Alias rewriting for parsed conditions.
//!
//! Two independent passes run once, immediately after parsing:
//!
//! - **Value aliases** replace a configured literal value for a given
//!   keyword in equality-family leaves (a legacy state name mapped to
//!   its current equivalent).
//! - **Column aliases** expand a single keyword into a test over
//!   several underlying keywords. The combining operator depends on the
//!   leaf's polarity: inclusive operators (`=`, `like`, `in`, …) expand
//!   into an OR (any alias may match), exclusive operators (`!=`,
//!   `unlike`, `not in`, …) expand into an AND (the test must hold for
//!   every alias). Getting this backward silently weakens filters.

use std::collections::HashMap;

use serde::Deserialize;

use crate::ast::{Condition, Group, GroupOperator, Value};
use crate::operator::Operator;

/// Alias configuration, materialized by the surrounding agent from its
/// check configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AliasConfig {
    /// Per-keyword literal value substitutions.
    pub value_aliases: HashMap<String, HashMap<String, String>>,
    /// Per-keyword expansion into equivalent underlying keywords.
    pub column_aliases: HashMap<String, Vec<String>>,
}

impl AliasConfig {
    /// Creates an empty alias configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if no aliases are configured.
    pub fn is_empty(&self) -> bool {
        self.value_aliases.is_empty() && self.column_aliases.is_empty()
    }

    /// Adds a value alias: `keyword = from` is rewritten to
    /// `keyword = to`.
    pub fn with_value_alias(
        mut self,
        keyword: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.value_aliases
            .entry(keyword.into())
            .or_default()
            .insert(from.into(), to.into());
        self
    }

    /// Adds a column alias: tests on `keyword` expand over `columns`.
    pub fn with_column_alias<I, S>(mut self, keyword: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_aliases
            .insert(keyword.into(), columns.into_iter().map(Into::into).collect());
        self
    }

    /// Applies both rewrite passes to a condition tree in place.
    ///
    /// Rewriting mutates the tree and must complete before any
    /// concurrent matching starts; the `&mut` receiver enforces this.
    pub fn apply(&self, condition: &mut Condition) {
        if self.is_empty() {
            return;
        }
        self.apply_value_aliases(condition);
        self.apply_column_aliases(condition);
    }

    fn apply_value_aliases(&self, condition: &mut Condition) {
        match condition {
            Condition::None => {}
            Condition::Leaf(leaf) => {
                let Some(replacements) = self.value_aliases.get(&leaf.keyword) else {
                    return;
                };
                match leaf.operator {
                    Operator::Equal | Operator::Unequal => {
                        if let Value::Text(text) = &mut leaf.value {
                            if let Some(replacement) = replacements.get(text) {
                                log::debug!(
                                    "value alias: {} {:?} -> {:?}",
                                    leaf.keyword,
                                    text,
                                    replacement
                                );
                                *text = replacement.clone();
                            }
                        }
                    }
                    Operator::InList | Operator::NotInList => {
                        if let Value::List(entries) = &mut leaf.value {
                            for entry in entries.iter_mut() {
                                if let Some(replacement) = replacements.get(entry) {
                                    *entry = replacement.clone();
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
            Condition::Group(group) => {
                for child in &mut group.children {
                    self.apply_value_aliases(child);
                }
            }
        }
    }

    fn apply_column_aliases(&self, condition: &mut Condition) {
        let replacement = match condition {
            Condition::None => None,
            Condition::Leaf(leaf) => {
                let Some(columns) = self.column_aliases.get(&leaf.keyword) else {
                    return;
                };
                match columns.as_slice() {
                    [] => None,
                    [only] => {
                        leaf.keyword = only.clone();
                        None
                    }
                    columns => {
                        let operator = if leaf.operator.is_exclusive() {
                            GroupOperator::And
                        } else {
                            GroupOperator::Or
                        };
                        let children = columns
                            .iter()
                            .map(|column| {
                                let mut aliased = leaf.clone();
                                aliased.keyword = column.clone();
                                Condition::Leaf(aliased)
                            })
                            .collect();
                        log::debug!(
                            "column alias: {} expands over {} keywords ({})",
                            leaf.keyword,
                            columns.len(),
                            operator
                        );
                        Some(Condition::Group(Group { operator, children }))
                    }
                }
            }
            Condition::Group(group) => {
                for child in &mut group.children {
                    self.apply_column_aliases(child);
                }
                None
            }
        };
        if let Some(expanded) = replacement {
            *condition = expanded;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ExpressionParser;

    fn parse(input: &str) -> Condition {
        ExpressionParser::parse(input).unwrap()
    }

    #[test]
    fn test_value_alias_on_equality() {
        let aliases = AliasConfig::new().with_value_alias("state", "started", "running");
        let mut condition = parse("state = started");
        aliases.apply(&mut condition);
        assert_eq!(condition.to_string(), "state = running");
    }

    #[test]
    fn test_value_alias_on_inequality() {
        let aliases = AliasConfig::new().with_value_alias("state", "started", "running");
        let mut condition = parse("state != started");
        aliases.apply(&mut condition);
        assert_eq!(condition.to_string(), "state != running");
    }

    #[test]
    fn test_value_alias_on_list_entries() {
        let aliases = AliasConfig::new().with_value_alias("state", "started", "running");
        let mut condition = parse("state in (started, stopped)");
        aliases.apply(&mut condition);
        assert_eq!(condition.to_string(), "state in (running, stopped)");
    }

    #[test]
    fn test_value_alias_leaves_containment_alone() {
        let aliases = AliasConfig::new().with_value_alias("state", "started", "running");
        let mut condition = parse("state like started");
        aliases.apply(&mut condition);
        assert_eq!(condition.to_string(), "state like started");
    }

    #[test]
    fn test_column_alias_inclusive_expands_to_or() {
        let aliases = AliasConfig::new().with_column_alias("name", ["name", "display"]);
        let mut condition = parse("name = 'xinetd'");
        aliases.apply(&mut condition);
        assert_eq!(condition.to_string(), "name = xinetd or display = xinetd");
    }

    #[test]
    fn test_column_alias_exclusive_expands_to_and() {
        let aliases = AliasConfig::new().with_column_alias("name", ["name", "display"]);
        let mut condition = parse("name unlike 'other'");
        aliases.apply(&mut condition);
        assert_eq!(
            condition.to_string(),
            "name unlike other and display unlike other"
        );
    }

    #[test]
    fn test_column_alias_single_target_renames_in_place() {
        let aliases = AliasConfig::new().with_column_alias("svc", ["service"]);
        let mut condition = parse("svc = nginx");
        aliases.apply(&mut condition);
        assert_eq!(condition.to_string(), "service = nginx");
    }

    #[test]
    fn test_column_alias_rewrites_nested_leaves() {
        let aliases = AliasConfig::new().with_column_alias("name", ["name", "display"]);
        let mut condition = parse("(name = a and state = up) or name = b");
        aliases.apply(&mut condition);
        assert_eq!(
            condition.to_string(),
            "((name = a or display = a) and state = up) or (name = b or display = b)"
        );
    }

    #[test]
    fn test_aliases_leave_unrelated_keywords_alone() {
        let aliases = AliasConfig::new()
            .with_value_alias("state", "started", "running")
            .with_column_alias("name", ["name", "display"]);
        let mut condition = parse("command = started");
        aliases.apply(&mut condition);
        assert_eq!(condition.to_string(), "command = started");
    }

    #[test]
    fn test_alias_config_from_json() {
        let aliases: AliasConfig = serde_json::from_str(
            r#"{
                "value_aliases": {"state": {"started": "running"}},
                "column_aliases": {"name": ["name", "display"]}
            }"#,
        )
        .unwrap();
        assert!(!aliases.is_empty());
        let mut condition = parse("name = a and state = started");
        aliases.apply(&mut condition);
        assert_eq!(
            condition.to_string(),
            "(name = a or display = a) and state = running"
        );
    }
}

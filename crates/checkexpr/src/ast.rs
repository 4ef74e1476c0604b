//! Condition tree for parsed filter and threshold expressions.

use std::fmt;

use regex::RegexBuilder;

use crate::error::{ParseError, ParseResult};
use crate::operator::Operator;
use crate::units;

/// The logical operator combining the children of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOperator {
    /// All children must hold.
    And,
    /// At least one child must hold.
    Or,
}

impl GroupOperator {
    /// Resolves a group-operator spelling (`and`/`or`/`&&`/`||`,
    /// case-insensitive).
    pub(crate) fn from_text(text: &str) -> Option<Self> {
        match text.to_lowercase().as_str() {
            "and" | "&&" => Some(GroupOperator::And),
            "or" | "||" => Some(GroupOperator::Or),
            _ => None,
        }
    }

    /// The canonical spelling used when rendering.
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupOperator::And => "and",
            GroupOperator::Or => "or",
        }
    }
}

impl fmt::Display for GroupOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A comparison value: a single string, or an ordered list of strings
/// for the list operators `in` / `not in`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A single value.
    Text(String),
    /// An ordered list of values (always non-empty).
    List(Vec<String>),
}

impl Value {
    /// The single value, or `None` for a list.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            Value::List(_) => None,
        }
    }

    /// The list entries, or `None` for a single value.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::Text(_) => None,
            Value::List(entries) => Some(entries),
        }
    }
}

/// A leaf predicate: one keyword tested against one value.
#[derive(Debug, Clone)]
pub struct Leaf {
    /// The row attribute name being tested.
    pub keyword: String,
    /// The canonical comparison operator.
    pub operator: Operator,
    /// The (normalized) comparison value.
    pub value: Value,
    /// Normalized unit annotation (`B`, `s`, `%`), if the value carried a
    /// recognized unit suffix.
    pub unit: Option<String>,
    /// Compiled pattern for the regex operator family, built once at
    /// parse time and reused for every row.
    pub(crate) pattern: Option<regex::Regex>,
}

impl Leaf {
    /// Builds a leaf from a raw value, applying value normalization:
    /// unit expansion for unquoted equality/ordering values, `/pattern/`
    /// slash-stripping and `/pattern/i` no-case upgrade plus pattern
    /// compilation for the regex family.
    pub(crate) fn new(
        keyword: String,
        operator: Operator,
        raw_value: &str,
        quoted: bool,
    ) -> ParseResult<Self> {
        if operator.is_regex() {
            let (pattern_text, force_nocase) = strip_regex_slashes(raw_value);
            let operator = if force_nocase {
                operator.to_nocase()
            } else {
                operator
            };
            let nocase = matches!(
                operator,
                Operator::RegexMatchNoCase | Operator::RegexMatchNoCaseNot
            );
            let pattern = RegexBuilder::new(pattern_text)
                .case_insensitive(nocase)
                .build()
                .map_err(|err| ParseError::invalid_regex(pattern_text, &err))?;
            return Ok(Leaf {
                keyword,
                operator,
                value: Value::Text(pattern_text.to_string()),
                unit: None,
                pattern: Some(pattern),
            });
        }

        let (value, unit) = if !quoted && unit_expansion_applies(operator) {
            units::normalize(raw_value)
        } else {
            (raw_value.to_string(), None)
        };
        Ok(Leaf {
            keyword,
            operator,
            value: Value::Text(value),
            unit,
            pattern: None,
        })
    }

    /// Builds a list leaf for `in` / `not in`.
    pub(crate) fn new_list(
        keyword: String,
        operator: Operator,
        entries: Vec<String>,
    ) -> ParseResult<Self> {
        if entries.is_empty() {
            return Err(ParseError::empty_list(operator.as_str()));
        }
        Ok(Leaf {
            keyword,
            operator,
            value: Value::List(entries),
            unit: None,
            pattern: None,
        })
    }
}

// The compiled pattern is derived from operator + value and excluded
// from comparisons.
impl PartialEq for Leaf {
    fn eq(&self, other: &Self) -> bool {
        self.keyword == other.keyword
            && self.operator == other.operator
            && self.value == other.value
            && self.unit == other.unit
    }
}

impl Eq for Leaf {}

/// Unit suffixes only make sense on values that are compared numerically.
fn unit_expansion_applies(operator: Operator) -> bool {
    matches!(operator, Operator::Equal | Operator::Unequal) || operator.is_ordering()
}

/// Strips the `/pattern/` and `/pattern/i` literal forms; the trailing
/// `i` upgrades the operator to its case-insensitive variant.
fn strip_regex_slashes(raw: &str) -> (&str, bool) {
    if let Some(rest) = raw.strip_prefix('/') {
        if let Some(pattern) = rest.strip_suffix("/i") {
            return (pattern, true);
        }
        if let Some(pattern) = rest.strip_suffix('/') {
            if !pattern.is_empty() || raw.len() > 2 {
                return (pattern, false);
            }
        }
    }
    (raw, false)
}

/// An ordered AND/OR combination of child conditions.
///
/// A group's operator is uniform for its direct children: mixing `and`
/// and `or` on one bracket level is a parse-time error, so a mixed group
/// is never a runtime state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// The logical operator combining the children.
    pub operator: GroupOperator,
    /// The ordered children (always two or more).
    pub children: Vec<Condition>,
}

/// A parsed condition: a leaf predicate, an AND/OR group, or the literal
/// filter `none` which matches every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// The literal filter value `none`; always matches.
    None,
    /// A single keyword/operator/value predicate.
    Leaf(Leaf),
    /// An AND/OR combination of child conditions.
    Group(Group),
}

impl Condition {
    /// Creates a group condition from two or more children.
    pub fn group(operator: GroupOperator, children: Vec<Condition>) -> Self {
        Condition::Group(Group { operator, children })
    }

    /// True for the always-matching `none` condition.
    pub fn is_none(&self) -> bool {
        matches!(self, Condition::None)
    }

    /// The distinct row attribute names this condition references, in
    /// first-reference order. Callers use this to decide which attributes
    /// must be populated before a final (authoritative) match pass.
    pub fn keywords(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_keywords(&mut out);
        out
    }

    fn collect_keywords<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Condition::None => {}
            Condition::Leaf(leaf) => {
                if !out.contains(&leaf.keyword.as_str()) {
                    out.push(&leaf.keyword);
                }
            }
            Condition::Group(group) => {
                for child in &group.children {
                    child.collect_keywords(out);
                }
            }
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>, nested: bool) -> fmt::Result {
        match self {
            Condition::None => f.write_str("none"),
            Condition::Leaf(leaf) => {
                write!(f, "{} {} ", leaf.keyword, leaf.operator)?;
                match &leaf.value {
                    Value::Text(text) => {
                        // A literal that merely looks like `90GB` must
                        // stay quoted, or re-parsing would expand it.
                        let force_quotes = leaf.unit.is_none()
                            && unit_expansion_applies(leaf.operator)
                            && units::normalize(text).1.is_some();
                        write_value(f, text, leaf.unit.as_deref(), force_quotes)
                    }
                    Value::List(entries) => {
                        f.write_str("(")?;
                        for (i, entry) in entries.iter().enumerate() {
                            if i > 0 {
                                f.write_str(", ")?;
                            }
                            write_value(f, entry, None, false)?;
                        }
                        f.write_str(")")
                    }
                }
            }
            Condition::Group(group) => {
                if nested {
                    f.write_str("(")?;
                }
                for (i, child) in group.children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", group.operator)?;
                    }
                    child.fmt_nested(f, true)?;
                }
                if nested {
                    f.write_str(")")?;
                }
                Ok(())
            }
        }
    }
}

/// Writes a value, quoting it when it would not survive re-tokenization
/// bare. The normalized unit is appended to the value text so that the
/// rendering re-parses to the same canonical form.
fn write_value(
    f: &mut fmt::Formatter<'_>,
    text: &str,
    unit: Option<&str>,
    force_quotes: bool,
) -> fmt::Result {
    let needs_quotes = force_quotes
        || text.is_empty()
        || text
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '\'' | '"' | '(' | ')' | ','));
    if needs_quotes {
        f.write_str("'")?;
        for c in text.chars() {
            if c == '\\' || c == '\'' {
                f.write_str("\\")?;
            }
            write!(f, "{}", c)?;
        }
        f.write_str("'")
    } else {
        f.write_str(text)?;
        if let Some(unit) = unit {
            f.write_str(unit)?;
        }
        Ok(())
    }
}

impl fmt::Display for Condition {
    /// Reconstructs a human-readable expression from the tree. The
    /// result is not always byte-identical to the original source text:
    /// aliasing, operator canonicalization and unit normalization are
    /// visible in the rendering.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_nested(f, false)
    }
}

/// An ordered sequence of independently supplied conditions (e.g.
/// repeated `filter=` arguments).
///
/// Members combine with OR semantics when matched: a row passes if any
/// member matches. An empty list matches every row — no filter
/// configured means nothing is excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionList(Vec<Condition>);

impl ConditionList {
    /// Creates an empty condition list.
    pub fn new() -> Self {
        ConditionList(Vec::new())
    }

    /// Appends a condition.
    pub fn push(&mut self, condition: Condition) {
        self.0.push(condition);
    }

    /// The number of conditions in the list.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the list holds no conditions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The conditions as a slice.
    pub fn as_slice(&self) -> &[Condition] {
        &self.0
    }

    /// Iterates over the conditions.
    pub fn iter(&self) -> std::slice::Iter<'_, Condition> {
        self.0.iter()
    }
}

impl From<Vec<Condition>> for ConditionList {
    fn from(conditions: Vec<Condition>) -> Self {
        ConditionList(conditions)
    }
}

impl FromIterator<Condition> for ConditionList {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        ConditionList(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ConditionList {
    type Item = &'a Condition;
    type IntoIter = std::slice::Iter<'a, Condition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_unit_expansion() {
        let leaf = Leaf::new("used".to_string(), Operator::Greater, "90GB", false).unwrap();
        assert_eq!(leaf.value, Value::Text("90000000000".to_string()));
        assert_eq!(leaf.unit.as_deref(), Some("B"));
    }

    #[test]
    fn test_quoted_value_stays_literal() {
        let leaf = Leaf::new("name".to_string(), Operator::Equal, "2h", true).unwrap();
        assert_eq!(leaf.value, Value::Text("2h".to_string()));
        assert_eq!(leaf.unit, None);
    }

    #[test]
    fn test_containment_value_never_unit_expands() {
        let leaf = Leaf::new("msg".to_string(), Operator::Contains, "2h", false).unwrap();
        assert_eq!(leaf.value, Value::Text("2h".to_string()));
        assert_eq!(leaf.unit, None);
    }

    #[test]
    fn test_regex_slash_form_upgrades_to_nocase() {
        let leaf = Leaf::new("name".to_string(), Operator::RegexMatch, "/blah/i", false).unwrap();
        assert_eq!(leaf.operator, Operator::RegexMatchNoCase);
        assert_eq!(leaf.value, Value::Text("blah".to_string()));
        assert!(leaf.pattern.is_some());
    }

    #[test]
    fn test_regex_invalid_pattern_is_parse_error() {
        let err = Leaf::new("name".to_string(), Operator::RegexMatch, "(unclosed", false)
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidRegex { .. }));
    }

    #[test]
    fn test_empty_list_rejected() {
        let err = Leaf::new_list("state".to_string(), Operator::InList, vec![]).unwrap_err();
        assert_eq!(
            err,
            ParseError::EmptyList {
                operator: "in".to_string()
            }
        );
    }

    #[test]
    fn test_leaf_equality_ignores_compiled_pattern() {
        let a = Leaf::new("name".to_string(), Operator::RegexMatch, "bl.h", false).unwrap();
        let b = Leaf::new("name".to_string(), Operator::RegexMatch, "bl.h", false).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_keywords_deduplicated_in_order() {
        let cond = Condition::group(
            GroupOperator::And,
            vec![
                Condition::Leaf(
                    Leaf::new("b".to_string(), Operator::Greater, "1", false).unwrap(),
                ),
                Condition::Leaf(
                    Leaf::new("a".to_string(), Operator::Greater, "2", false).unwrap(),
                ),
                Condition::Leaf(
                    Leaf::new("b".to_string(), Operator::Lower, "9", false).unwrap(),
                ),
            ],
        );
        assert_eq!(cond.keywords(), vec!["b", "a"]);
    }

    #[test]
    fn test_display_leaf() {
        let cond = Condition::Leaf(
            Leaf::new("used".to_string(), Operator::Greater, "90GB", false).unwrap(),
        );
        assert_eq!(cond.to_string(), "used > 90000000000B");
    }

    #[test]
    fn test_display_quotes_values_with_spaces() {
        let cond = Condition::Leaf(
            Leaf::new("name".to_string(), Operator::Equal, "foo bar", true).unwrap(),
        );
        assert_eq!(cond.to_string(), "name = 'foo bar'");
    }

    #[test]
    fn test_display_group_nesting() {
        let inner = Condition::group(
            GroupOperator::Or,
            vec![
                Condition::Leaf(Leaf::new("a".to_string(), Operator::Equal, "1", false).unwrap()),
                Condition::Leaf(Leaf::new("b".to_string(), Operator::Equal, "2", false).unwrap()),
            ],
        );
        let outer = Condition::group(
            GroupOperator::And,
            vec![
                inner,
                Condition::Leaf(Leaf::new("c".to_string(), Operator::Equal, "3", false).unwrap()),
            ],
        );
        assert_eq!(outer.to_string(), "(a = 1 or b = 2) and c = 3");
    }

    #[test]
    fn test_display_list() {
        let cond = Condition::Leaf(
            Leaf::new_list(
                "state".to_string(),
                Operator::InList,
                vec!["a".to_string(), "b c".to_string()],
            )
            .unwrap(),
        );
        assert_eq!(cond.to_string(), "state in (a, 'b c')");
    }

    #[test]
    fn test_display_none() {
        assert_eq!(Condition::None.to_string(), "none");
    }
}

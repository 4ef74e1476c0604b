//! Canonical comparison operators and their textual spellings.

use std::fmt;

/// A canonical comparison operator.
///
/// The expression language accepts many textual spellings per operator
/// (`=`, `==`, `eq`, `is` all mean [`Operator::Equal`]); resolution is
/// case-insensitive and happens once at parse time via
/// [`Operator::from_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equality (`=`, `==`, `eq`, `is`). Numeric when both sides parse as
    /// numbers, raw string comparison otherwise.
    Equal,
    /// Inequality (`!=`, `ne`, `is not`).
    Unequal,
    /// Case-insensitive substring containment (`like`, `ilike`).
    Contains,
    /// Case-sensitive substring containment (`slike`).
    ContainsStrict,
    /// Negated case-insensitive containment (`unlike`, `not like`, `not ilike`).
    ContainsNot,
    /// Regular expression match (`~`, `regex`).
    RegexMatch,
    /// Case-insensitive regular expression match (`~~`).
    RegexMatchNoCase,
    /// Negated regular expression match (`!~`).
    RegexMatchNot,
    /// Negated case-insensitive regular expression match (`!~~`).
    RegexMatchNoCaseNot,
    /// Numeric less-than (`<`, `lt`).
    Lower,
    /// Numeric less-than-or-equal (`<=`, `le`).
    LowerEqual,
    /// Numeric greater-than (`>`, `gt`).
    Greater,
    /// Numeric greater-than-or-equal (`>=`, `ge`).
    GreaterEqual,
    /// List membership (`in`).
    InList,
    /// Negated list membership (`not in`).
    NotInList,
}

/// Symbolic operator spellings that may cuddle against a keyword or value
/// with no separating space (`core_id!=core1`). Ordered longest-first so
/// that the longest spelling wins at any given position.
pub(crate) const SYMBOLIC_OPERATORS: &[&str] = &[
    "!~~", "<=", ">=", "==", "!=", "!~", "~~", "<", ">", "=", "~",
];

impl Operator {
    /// Resolves an operator spelling (case-insensitive) to its canonical
    /// operator. Two-token spellings (`not in`, `is not`, `not like`,
    /// `not ilike`) must be joined with a single space before resolution.
    pub fn from_text(text: &str) -> Option<Self> {
        match text.to_lowercase().as_str() {
            "=" | "==" | "eq" | "is" => Some(Operator::Equal),
            "!=" | "ne" | "is not" => Some(Operator::Unequal),
            "like" | "ilike" => Some(Operator::Contains),
            "slike" => Some(Operator::ContainsStrict),
            "unlike" | "not like" | "not ilike" => Some(Operator::ContainsNot),
            "~" | "regex" => Some(Operator::RegexMatch),
            "~~" => Some(Operator::RegexMatchNoCase),
            "!~" => Some(Operator::RegexMatchNot),
            "!~~" => Some(Operator::RegexMatchNoCaseNot),
            "<" | "lt" => Some(Operator::Lower),
            "<=" | "le" => Some(Operator::LowerEqual),
            ">" | "gt" => Some(Operator::Greater),
            ">=" | "ge" => Some(Operator::GreaterEqual),
            "in" => Some(Operator::InList),
            "not in" => Some(Operator::NotInList),
            _ => None,
        }
    }

    /// The canonical spelling used when rendering a condition back to text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::Unequal => "!=",
            Operator::Contains => "like",
            Operator::ContainsStrict => "slike",
            Operator::ContainsNot => "unlike",
            Operator::RegexMatch => "~",
            Operator::RegexMatchNoCase => "~~",
            Operator::RegexMatchNot => "!~",
            Operator::RegexMatchNoCaseNot => "!~~",
            Operator::Lower => "<",
            Operator::LowerEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::InList => "in",
            Operator::NotInList => "not in",
        }
    }

    /// True for operators that assert a non-match (`!=`, `unlike`, `!~`,
    /// `!~~`, `not in`).
    ///
    /// Column aliasing expands an exclusive leaf into an AND over the
    /// aliased keywords (the test must hold for every alias), while an
    /// inclusive leaf expands into an OR (any alias may match).
    pub fn is_exclusive(&self) -> bool {
        matches!(
            self,
            Operator::Unequal
                | Operator::ContainsNot
                | Operator::RegexMatchNot
                | Operator::RegexMatchNoCaseNot
                | Operator::NotInList
        )
    }

    /// True for the list operators `in` and `not in`.
    pub fn takes_list(&self) -> bool {
        matches!(self, Operator::InList | Operator::NotInList)
    }

    /// True for the regular-expression operator family.
    pub fn is_regex(&self) -> bool {
        matches!(
            self,
            Operator::RegexMatch
                | Operator::RegexMatchNoCase
                | Operator::RegexMatchNot
                | Operator::RegexMatchNoCaseNot
        )
    }

    /// True for the numeric ordering operators `<`, `<=`, `>`, `>=`.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Operator::Lower | Operator::LowerEqual | Operator::Greater | Operator::GreaterEqual
        )
    }

    /// Upgrades a plain regex operator to its case-insensitive variant.
    /// Used when a pattern is written in the `/pattern/i` form.
    pub(crate) fn to_nocase(self) -> Self {
        match self {
            Operator::RegexMatch => Operator::RegexMatchNoCase,
            Operator::RegexMatchNot => Operator::RegexMatchNoCaseNot,
            other => other,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

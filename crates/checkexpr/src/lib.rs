//! Filter and threshold expression engine for health checks.
//!
//! Checks accept user-supplied `warn=`, `crit=` and `filter=` expressions
//! written in a small query language; every incoming data row (a mapping
//! from attribute name to string value) is tested against these
//! expressions to decide pass/fail state and to select which rows to
//! report. This crate parses those expressions into a condition tree and
//! evaluates the tree against rows with three-valued logic.
//!
//! # Supported Syntax
//!
//! ## Comparisons
//! - `=`, `==`, `eq`, `is` — equality (numeric when both sides are numbers)
//! - `!=`, `ne`, `is not` — inequality
//! - `<`, `lt`, `<=`, `le`, `>`, `gt`, `>=`, `ge` — numeric ordering
//! - `like`, `ilike` — case-insensitive substring
//! - `slike` — case-sensitive substring
//! - `unlike`, `not like`, `not ilike` — negated case-insensitive substring
//! - `~`, `regex` — regex match; `~~` — case-insensitive regex match;
//!   `!~`, `!~~` — negated variants; `/pattern/i` upgrades `~` to `~~`
//! - `in`, `not in` — membership in a parenthesized list: `state in ('a','b')`
//!
//! ## Values
//! - quoting: `'single'` or `"double"`, with backslash escapes
//! - byte units: `kb`, `mb`, `gb`, `tb`, `pb` (decimal) and `kib` …
//!   `pib` (binary) expand to raw byte counts (`90GB` → `90000000000`)
//! - duration units: `s`, `m`, `h`, `d` expand to seconds (`2h` → `7200`)
//! - `str(...)` embeds arbitrary raw text as one quoted literal
//!
//! ## Boolean Operators
//! - `and` / `&&`, `or` / `||`, `()` for grouping; mixing `and` and
//!   `or` on one bracket level requires explicit brackets
//! - the literal filter `none` matches every row
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use checkexpr_rs::ExpressionParser;
//!
//! let condition = ExpressionParser::parse("(state = running and usage > 90%) or state = dead")
//!     .unwrap();
//!
//! let row = HashMap::from([
//!     ("state".to_string(), "running".to_string()),
//!     ("usage".to_string(), "97".to_string()),
//! ]);
//! let result = condition.matches(&row);
//! assert!(result.matched);
//! assert!(result.certain);
//! ```
//!
//! Evaluation is three-valued: a leaf whose keyword is absent from the
//! row is *indeterminate* rather than false, and groups propagate
//! indeterminacy with Kleene AND/OR semantics. Callers inspect
//! [`MatchResult::certain`] to decide whether an answer is conclusive —
//! an optimistic pass over a partially populated row may treat
//! indeterminate as acceptable, while a final pass requires certainty.
//!
//! Parsed conditions are immutable after the optional alias rewrite and
//! may be shared across threads; parsing and matching perform no I/O.

mod alias;
mod ast;
mod error;
mod evaluator;
mod lexer;
mod operator;
mod parser;
mod threshold;
mod units;

pub use alias::AliasConfig;
pub use ast::{Condition, ConditionList, Group, GroupOperator, Leaf, Value};
pub use error::{ParseError, ParseResult};
pub use evaluator::MatchResult;
pub use operator::Operator;
pub use parser::{ExpressionParser, ParseOptions};
pub use threshold::threshold_string;
pub use units::format_number;

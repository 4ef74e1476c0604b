//! Recursive descent parser for filter and threshold expressions.

use chrono_tz::Tz;

use crate::alias::AliasConfig;
use crate::ast::{Condition, ConditionList, GroupOperator, Leaf};
use crate::error::{ParseError, ParseResult};
use crate::lexer::{self, Token};
use crate::operator::{Operator, SYMBOLIC_OPERATORS};

/// Options for parsing an expression.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Alias configuration applied to the tree immediately after parsing.
    pub aliases: Option<AliasConfig>,
    /// Timezone for date/time-valued keywords. Accepted for forward
    /// compatibility; not otherwise interpreted by this engine.
    pub timezone: Option<Tz>,
}

impl ParseOptions {
    /// Creates empty parse options (no aliases, no timezone).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the alias configuration.
    pub fn with_aliases(mut self, aliases: AliasConfig) -> Self {
        self.aliases = Some(aliases);
        self
    }

    /// Sets the timezone.
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = Some(timezone);
        self
    }
}

/// Parser for filter and threshold expressions.
///
/// # Grammar
///
/// ```text
/// expression ::= clause (group_op clause)*        -- one operator per level
/// clause     ::= "(" expression ")" | leaf | "none"
/// leaf       ::= keyword operator value
///              | keyword list_op "(" entry ("," entry)* ")"
/// group_op   ::= "and" | "or" | "&&" | "||"
/// ```
///
/// Mixing `and` and `or` on one bracket level is rejected; the caller
/// must bracket explicitly. A keyword may cuddle with a symbolic
/// operator (`core_id!=core1`), and symbolic operators may cuddle with
/// their value (`core_id != core1`, `core_id !=core1` and
/// `core_id!= core1` all parse identically).
///
/// # Example
///
/// ```
/// use checkexpr_rs::{Condition, ExpressionParser};
///
/// let condition = ExpressionParser::parse("used > 90GB").unwrap();
/// assert!(matches!(condition, Condition::Leaf(_)));
///
/// // Mixed boolean operators require brackets.
/// assert!(ExpressionParser::parse("a > 1 and b > 1 or c > 1").is_err());
/// assert!(ExpressionParser::parse("(a > 1 and b > 1) or c > 1").is_ok());
/// ```
pub struct ExpressionParser {
    tokens: Vec<Token>,
    position: usize,
}

impl ExpressionParser {
    /// Parses an expression string into a [`Condition`] tree.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for empty input, unbalanced brackets or
    /// quotes, unknown operators, missing values, empty lists, invalid
    /// regex patterns, and mixed `and`/`or` without brackets.
    pub fn parse(input: &str) -> ParseResult<Condition> {
        Self::parse_with(input, &ParseOptions::default())
    }

    /// Parses an expression string, applying the given options.
    ///
    /// Alias rewriting (if configured) runs once, immediately after
    /// parsing; the returned tree is final and may be matched against
    /// rows concurrently.
    pub fn parse_with(input: &str, options: &ParseOptions) -> ParseResult<Condition> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyExpression);
        }

        let expanded = lexer::expand_str_literals(trimmed)?;
        let tokens = lexer::tokenize(&expanded)?;
        if tokens.is_empty() {
            return Err(ParseError::EmptyExpression);
        }

        let mut parser = Self { tokens, position: 0 };
        let mut condition = parser.parse_group(false)?;

        // Check that we consumed all tokens
        if let Some(remaining) = parser.peek() {
            return Err(ParseError::unexpected_token(remaining.text.clone()));
        }

        if let Some(aliases) = &options.aliases {
            aliases.apply(&mut condition);
        }
        log::trace!("parsed expression {:?} as: {}", trimmed, condition);
        Ok(condition)
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Consumes and returns the current token.
    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Parses one bracket level: clauses joined by a single group
    /// operator. Returns the lone clause directly when only one was
    /// parsed — group wrapping only occurs for two or more children.
    fn parse_group(&mut self, nested: bool) -> ParseResult<Condition> {
        let mut children: Vec<Condition> = Vec::new();
        let mut group_operator: Option<GroupOperator> = None;

        loop {
            match self.peek() {
                None => {
                    if nested {
                        return Err(ParseError::UnbalancedBracket);
                    }
                    break;
                }
                Some(token) if token.is_symbol(")") => {
                    if !nested {
                        return Err(ParseError::UnbalancedBracket);
                    }
                    break;
                }
                Some(_) => {}
            }

            if !children.is_empty() {
                let token = self.advance().ok_or(ParseError::UnexpectedEndOfInput)?;
                let resolved = if token.quoted {
                    None
                } else {
                    GroupOperator::from_text(&token.text)
                };
                let operator =
                    resolved.ok_or_else(|| ParseError::unexpected_token(token.text.clone()))?;
                match group_operator {
                    None => group_operator = Some(operator),
                    Some(existing) if existing != operator => {
                        return Err(ParseError::MixedGroupOperators);
                    }
                    Some(_) => {}
                }
                if self.peek().is_none() {
                    return Err(ParseError::UnexpectedEndOfInput);
                }
            }

            let child = if self.peek().is_some_and(|t| t.is_symbol("(")) {
                self.advance();
                let inner = self.parse_group(true)?;
                match self.advance() {
                    Some(token) if token.is_symbol(")") => {}
                    _ => return Err(ParseError::UnbalancedBracket),
                }
                inner
            } else {
                self.parse_leaf()?
            };
            children.push(child);
        }

        match children.len() {
            0 => Err(ParseError::EmptyExpression),
            1 => Ok(children.remove(0)),
            _ => Ok(Condition::group(
                group_operator.unwrap_or(GroupOperator::And),
                children,
            )),
        }
    }

    /// Parses one leaf predicate: keyword, operator (possibly two-token
    /// or cuddled), and value (single or list).
    fn parse_leaf(&mut self) -> ParseResult<Condition> {
        let keyword_token = self.advance().ok_or(ParseError::UnexpectedEndOfInput)?;

        let mut keyword = keyword_token.text.clone();
        let mut pending_operator: Option<String> = None;
        let mut pending_value: Option<Token> = None;

        if !keyword_token.quoted {
            if let Some((kw, symbol, rest)) = split_cuddled(&keyword_token.text) {
                keyword = kw.to_string();
                pending_operator = Some(symbol.to_string());
                if !rest.is_empty() {
                    pending_value = Some(Token {
                        text: rest.to_string(),
                        quoted: false,
                    });
                }
            }
        }

        // The literal filter `none` always matches; it only acts as a
        // keyword when an operator follows.
        if pending_operator.is_none()
            && !keyword_token.quoted
            && keyword.eq_ignore_ascii_case("none")
            && self.at_clause_end()
        {
            return Ok(Condition::None);
        }

        let operator_text = match pending_operator {
            Some(text) => text,
            None => {
                let token = self.advance().ok_or(ParseError::UnexpectedEndOfInput)?;
                if token.quoted {
                    return Err(ParseError::unknown_operator(token.text));
                }
                if let Some((symbol, rest)) = split_leading_symbol(&token.text) {
                    if !rest.is_empty() {
                        pending_value = Some(Token {
                            text: rest.to_string(),
                            quoted: false,
                        });
                    }
                    symbol.to_string()
                } else {
                    self.resolve_word_operator(token.text)?
                }
            }
        };
        let operator = Operator::from_text(&operator_text)
            .ok_or_else(|| ParseError::unknown_operator(operator_text.clone()))?;

        if operator.takes_list() {
            match self.advance() {
                Some(token) if token.is_symbol("(") => {}
                Some(token) => return Err(ParseError::unexpected_token(token.text)),
                None => return Err(ParseError::missing_value(operator.as_str())),
            }
            let entries = self.parse_list()?;
            return Ok(Condition::Leaf(Leaf::new_list(keyword, operator, entries)?));
        }

        let value_token = match pending_value {
            Some(token) => token,
            None => {
                let token = self
                    .advance()
                    .ok_or_else(|| ParseError::missing_value(operator.as_str()))?;
                if token.is_symbol(")") || token.is_symbol("(") {
                    return Err(ParseError::missing_value(operator.as_str()));
                }
                token
            }
        };
        let leaf = Leaf::new(keyword, operator, &value_token.text, value_token.quoted)?;
        Ok(Condition::Leaf(leaf))
    }

    /// Combines two-token operator spellings: `not in`, `not like`,
    /// `not ilike`, `is not`. A lone `is` resolves to equality.
    fn resolve_word_operator(&mut self, first: String) -> ParseResult<String> {
        let lower = first.to_lowercase();
        match lower.as_str() {
            "not" => {
                let follower = self
                    .peek()
                    .filter(|t| !t.quoted)
                    .map(|t| t.text.to_lowercase());
                if let Some(second) = follower {
                    if matches!(second.as_str(), "in" | "like" | "ilike") {
                        self.advance();
                        return Ok(format!("not {second}"));
                    }
                }
                Ok(first)
            }
            "is" => {
                let negated = self
                    .peek()
                    .is_some_and(|t| !t.quoted && t.text.eq_ignore_ascii_case("not"));
                if negated {
                    self.advance();
                    Ok("is not".to_string())
                } else {
                    Ok(first)
                }
            }
            _ => Ok(first),
        }
    }

    /// Parses a parenthesized comma-separated value list; the opening
    /// bracket has already been consumed.
    fn parse_list(&mut self) -> ParseResult<Vec<String>> {
        let mut entries = Vec::new();
        loop {
            let token = self.advance().ok_or(ParseError::UnbalancedBracket)?;
            if token.is_symbol(")") {
                break;
            }
            if token.is_symbol("(") {
                return Err(ParseError::unexpected_token("("));
            }
            if token.quoted {
                entries.push(token.text);
            } else {
                for part in token.text.split(',') {
                    let part = part.trim();
                    if !part.is_empty() {
                        entries.push(part.to_string());
                    }
                }
            }
        }
        Ok(entries)
    }

    /// True when the next token ends the current clause (end of input, a
    /// closing bracket, or a group operator).
    fn at_clause_end(&self) -> bool {
        match self.peek() {
            None => true,
            Some(token) => {
                token.is_symbol(")")
                    || (!token.quoted && GroupOperator::from_text(&token.text).is_some())
            }
        }
    }
}

impl ConditionList {
    /// Parses several independently supplied expressions (e.g. repeated
    /// `filter=` arguments) into one list. The list combines its members
    /// with OR semantics when matched.
    pub fn parse_all<'a, I>(expressions: I, options: &ParseOptions) -> ParseResult<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        expressions
            .into_iter()
            .map(|expression| ExpressionParser::parse_with(expression, options))
            .collect()
    }
}

/// Splits a keyword token that cuddles with a symbolic operator
/// (`core_id!=core1` → `core_id`, `!=`, `core1`). The keyword part must
/// be non-empty; the value part may be empty when the value follows as
/// its own token.
fn split_cuddled(text: &str) -> Option<(&str, &str, &str)> {
    for (i, _) in text.char_indices() {
        if i == 0 {
            continue;
        }
        for symbol in SYMBOLIC_OPERATORS {
            if text[i..].starts_with(symbol) {
                return Some((&text[..i], *symbol, &text[i + symbol.len()..]));
            }
        }
    }
    None
}

/// Splits a symbolic operator cuddled with its value (`!=core1` → `!=`,
/// `core1`). Longest spelling wins.
fn split_leading_symbol(text: &str) -> Option<(&str, &str)> {
    SYMBOLIC_OPERATORS
        .iter()
        .find_map(|symbol| text.strip_prefix(symbol).map(|rest| (*symbol, rest)))
}

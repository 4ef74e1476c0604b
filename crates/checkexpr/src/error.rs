//! Error types for expression parsing.

use thiserror::Error;

/// A specialized Result type for expression parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors that can occur while parsing a filter or threshold expression.
///
/// Parse errors are returned synchronously and abort parsing of that
/// expression; evaluation itself never fails (missing row attributes and
/// unparsable comparands degrade to indeterminate or false results).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The expression is empty or contains no tokens.
    #[error("expression is empty")]
    EmptyExpression,

    /// An unexpected token was encountered during parsing.
    #[error("unexpected token: {token}")]
    UnexpectedToken {
        /// The unexpected token that was encountered.
        token: String,
    },

    /// The expression ended where more input was required.
    #[error("unexpected end of expression")]
    UnexpectedEndOfInput,

    /// An opening bracket has no matching closing bracket (or vice versa).
    #[error("unbalanced brackets")]
    UnbalancedBracket,

    /// A quoted string was never closed.
    #[error("unterminated quote")]
    UnterminatedQuote,

    /// A `str(...)` literal was never closed.
    #[error("unterminated str() literal")]
    UnterminatedStrLiteral,

    /// Operator text that resolves to no known operator.
    #[error("unknown operator: {operator}")]
    UnknownOperator {
        /// The unrecognized operator text.
        operator: String,
    },

    /// An operator was not followed by a value.
    #[error("missing value after operator '{operator}'")]
    MissingValue {
        /// The operator that is missing its value.
        operator: String,
    },

    /// A list operator was given an empty list.
    #[error("empty list after operator '{operator}'")]
    EmptyList {
        /// The list operator whose list is empty.
        operator: String,
    },

    /// `and` and `or` were mixed on one bracket level.
    #[error("cannot mix 'and' and 'or' on the same bracket level, use explicit brackets")]
    MixedGroupOperators,

    /// A regex-operator value failed to compile.
    #[error("invalid regex '{pattern}': {message}")]
    InvalidRegex {
        /// The pattern that failed to compile.
        pattern: String,
        /// The regex engine's error message.
        message: String,
    },
}

impl ParseError {
    /// Creates an unexpected token error.
    pub fn unexpected_token(token: impl Into<String>) -> Self {
        ParseError::UnexpectedToken {
            token: token.into(),
        }
    }

    /// Creates an unknown operator error.
    pub fn unknown_operator(operator: impl Into<String>) -> Self {
        ParseError::UnknownOperator {
            operator: operator.into(),
        }
    }

    /// Creates a missing value error.
    pub fn missing_value(operator: impl Into<String>) -> Self {
        ParseError::MissingValue {
            operator: operator.into(),
        }
    }

    /// Creates an empty list error.
    pub fn empty_list(operator: impl Into<String>) -> Self {
        ParseError::EmptyList {
            operator: operator.into(),
        }
    }

    /// Creates an invalid regex error from the regex engine's error.
    pub fn invalid_regex(pattern: impl Into<String>, err: &regex::Error) -> Self {
        ParseError::InvalidRegex {
            pattern: pattern.into(),
            message: err.to_string(),
        }
    }
}

//! Lexer (tokenizer) and string-literal preprocessor for expressions.
//!
//! Tokenization splits an expression on whitespace, keeps quoted runs
//! (`'...'` or `"..."`, with backslash escapes) as single tokens, and
//! emits `(` / `)` outside quotes as standalone tokens even when they
//! cuddle against adjacent text. A bracket inside a quoted run is not a
//! delimiter.
//!
//! Before tokenization, `str(...)` pseudo-function calls are expanded
//! into properly escaped single-quoted literals so that macro-expanded
//! or otherwise irregular text can be embedded safely as a value.

use crate::error::{ParseError, ParseResult};

/// A token produced by the lexer.
///
/// `quoted` records whether the token came from a quoted run; later
/// stages use it to keep quoted values literal (no unit expansion, no
/// operator splitting) and to distinguish `'('` the value from `(` the
/// bracket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    /// The token text, with surrounding quotes stripped and backslash
    /// escapes resolved.
    pub text: String,
    /// True if the token was enclosed in single or double quotes.
    pub quoted: bool,
}

impl Token {
    /// True if this token is the given bracket or separator character
    /// (quoted tokens never act as separators).
    pub fn is_symbol(&self, symbol: &str) -> bool {
        !self.quoted && self.text == symbol
    }
}

/// Expands every `str(...)` occurrence into an escaped single-quoted
/// literal. The closing parenthesis is found by depth counting, so the
/// raw text may itself contain balanced parentheses as well as single
/// and double quotes.
pub(crate) fn expand_str_literals(input: &str) -> ParseResult<String> {
    if !input.contains("str(") {
        return Ok(input.to_string());
    }

    let mut out = String::with_capacity(input.len() + 8);
    let mut rest = input;
    while let Some(pos) = find_str_call(rest) {
        out.push_str(&rest[..pos]);
        let body_start = pos + "str(".len();

        let mut depth = 1usize;
        let mut body_end = None;
        for (i, c) in rest[body_start..].char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        body_end = Some(body_start + i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let Some(body_end) = body_end else {
            return Err(ParseError::UnterminatedStrLiteral);
        };

        out.push('\'');
        for c in rest[body_start..body_end].chars() {
            if c == '\\' || c == '\'' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('\'');
        rest = &rest[body_end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Finds the next `str(` call that starts a word (start of input, or
/// preceded by whitespace or an opening bracket).
fn find_str_call(s: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(rel) = s[from..].find("str(") {
        let pos = from + rel;
        let starts_word = s[..pos]
            .chars()
            .next_back()
            .map_or(true, |c| c.is_whitespace() || c == '(');
        if starts_word {
            return Some(pos);
        }
        from = pos + "str(".len();
    }
    None
}

/// Tokenizes an expression string.
pub(crate) fn tokenize(input: &str) -> ParseResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars();

    let flush = |current: &mut String, tokens: &mut Vec<Token>| {
        if !current.is_empty() {
            tokens.push(Token {
                text: std::mem::take(current),
                quoted: false,
            });
        }
    };

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => flush(&mut current, &mut tokens),
            '\'' | '"' => {
                flush(&mut current, &mut tokens);
                let mut text = String::new();
                let mut closed = false;
                while let Some(c2) = chars.next() {
                    if c2 == c {
                        closed = true;
                        break;
                    }
                    if c2 == '\\' {
                        // An escaped character stands for itself.
                        match chars.next() {
                            Some(escaped) => text.push(escaped),
                            None => {
                                text.push('\\');
                                break;
                            }
                        }
                    } else {
                        text.push(c2);
                    }
                }
                if !closed {
                    return Err(ParseError::UnterminatedQuote);
                }
                tokens.push(Token { text, quoted: true });
            }
            '(' | ')' => {
                flush(&mut current, &mut tokens);
                tokens.push(Token {
                    text: c.to_string(),
                    quoted: false,
                });
            }
            _ => current.push(c),
        }
    }
    flush(&mut current, &mut tokens);
    Ok(tokens)
}

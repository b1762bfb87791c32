//! Path templates with named placeholders.
//!
//! A template such as `/files/{name}.{ext}` is compiled into alternating
//! literal and placeholder tokens. Placeholders may sit anywhere inside a
//! segment, but two placeholders always need literal text between them so
//! that matching stays deterministic.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use super::core::ParamVec;

static PLACEHOLDER_NAME: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Literal(String),
    Placeholder(Arc<str>),
}

/// A parsed path template.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    pattern: String,
    tokens: Vec<Token>,
}

fn invalid(pattern: &str, reason: impl Into<String>) -> Error {
    Error::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.into(),
    }
}

fn valid_name(name: &str) -> bool {
    match PLACEHOLDER_NAME.as_ref() {
        Ok(re) => re.is_match(name),
        Err(_) => false,
    }
}

impl PathTemplate {
    /// Parse a template, rejecting malformed placeholder syntax.
    pub fn parse(pattern: &str) -> Result<Self> {
        if !pattern.starts_with('/') {
            return Err(invalid(pattern, "pattern must start with '/'"));
        }

        let mut tokens: Vec<Token> = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars();

        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for n in chars.by_ref() {
                        match n {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(invalid(pattern, "nested '{'")),
                            '/' => return Err(invalid(pattern, "placeholder spans a '/'")),
                            other => name.push(other),
                        }
                    }
                    if !closed {
                        return Err(invalid(pattern, "unterminated placeholder"));
                    }
                    if name.is_empty() {
                        return Err(invalid(pattern, "empty placeholder name"));
                    }
                    if !valid_name(&name) {
                        return Err(invalid(pattern, format!("invalid placeholder name '{name}'")));
                    }
                    if literal.is_empty() {
                        // only reachable after another placeholder, the pattern starts with '/'
                        return Err(invalid(
                            pattern,
                            format!("placeholder '{name}' directly follows another placeholder"),
                        ));
                    }
                    let duplicate = tokens
                        .iter()
                        .any(|t| matches!(t, Token::Placeholder(p) if p.as_ref() == name));
                    if duplicate {
                        return Err(invalid(pattern, format!("placeholder '{name}' repeated")));
                    }
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                    tokens.push(Token::Placeholder(Arc::from(name)));
                }
                '}' => return Err(invalid(pattern, "unbalanced '}'")),
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            tokens,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Placeholder names in template order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match t {
            Token::Placeholder(name) => Some(name.as_ref()),
            Token::Literal(_) => None,
        })
    }

    /// Literal text before the first placeholder. Drives match precedence.
    pub fn literal_prefix(&self) -> &str {
        match self.tokens.first() {
            Some(Token::Literal(lit)) => lit,
            _ => "",
        }
    }

    pub(crate) fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Match a concrete path, appending raw placeholder values to `out`.
    ///
    /// Leaves `out` untouched when the path does not match.
    pub(crate) fn match_raw<'p>(&self, path: &'p str, out: &mut Vec<(Arc<str>, &'p str)>) -> bool {
        let start = out.len();
        if match_tokens(&self.tokens, path, out) {
            true
        } else {
            out.truncate(start);
            false
        }
    }

    /// Match and decode in one step.
    pub(crate) fn capture(
        &self,
        path: &str,
        decode: &dyn Fn(&str) -> Option<String>,
    ) -> Option<ParamVec> {
        let mut raw = Vec::with_capacity(self.tokens.len() / 2);
        if !self.match_raw(path, &mut raw) {
            return None;
        }
        let mut params = ParamVec::new();
        for (name, value) in raw {
            params.push((name, decode(value)?));
        }
        Some(params)
    }
}

fn match_tokens<'p>(tokens: &[Token], path: &'p str, out: &mut Vec<(Arc<str>, &'p str)>) -> bool {
    let Some((token, rest)) = tokens.split_first() else {
        return path.is_empty();
    };

    match token {
        Token::Literal(lit) => match path.strip_prefix(lit.as_str()) {
            Some(remaining) => match_tokens(rest, remaining, out),
            None => false,
        },
        Token::Placeholder(name) => {
            // values never cross a segment boundary
            let limit = path.find('/').unwrap_or(path.len());
            match rest.split_first() {
                None => {
                    if limit == path.len() && !path.is_empty() {
                        out.push((Arc::clone(name), path));
                        true
                    } else {
                        false
                    }
                }
                Some((Token::Literal(next), after)) => {
                    let Some(first) = path.chars().next() else {
                        return false;
                    };
                    let step = next.chars().next().map(char::len_utf8).unwrap_or(1);
                    let mut from = first.len_utf8();
                    while let Some(offset) = path.get(from..).and_then(|s| s.find(next.as_str())) {
                        let end = from + offset;
                        if end > limit {
                            break;
                        }
                        let mark = out.len();
                        out.push((Arc::clone(name), &path[..end]));
                        if match_tokens(after, &path[end + next.len()..], out) {
                            return true;
                        }
                        out.truncate(mark);
                        from = end + step;
                    }
                    false
                }
                Some((Token::Placeholder(_), _)) => false,
            }
        }
    }
}

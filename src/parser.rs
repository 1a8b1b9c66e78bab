//! Parses pattern strings (e.g. `GET /users/{id:[0-9]+}`) into a [`RawRoute`], an ordered
//! sequence of [`RawStep`]s that [`crate::route`] later compiles into the domain-level
//! [`crate::route::Step`] used by the tree builder.
//!
//! The grammar is small enough that a hand-rolled byte-cursor recursive descent parser reads
//! more directly than a combinator pipeline would.

use std::collections::HashSet;

use crate::error::{ParseError, ParseErrorKind};

/// A parameter's delimiter, before it's resolved against [`crate::RouterOptions::default_until`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawDelimiter {
    /// Consume up to (not including) the first occurrence of this byte
    Byte(u8),

    /// No explicit delimiter was written; fall back to the router's configured default
    Default,

    /// `{name::\n}` or `{name:regex:\n}`, consumes all remaining input
    EndOfInput,
}

/// One atomic unit of an unparsed pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawStep {
    Exact(Vec<u8>),
    Until {
        name: String,
        until: RawDelimiter,
    },
    Regex {
        name: String,
        pattern: String,
        until: RawDelimiter,
    },
}

/// The result of parsing a pattern string, before regex compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRoute {
    pub steps: Vec<RawStep>,
}

/// Parse a pattern string into its raw, uncompiled steps
pub fn parse_pattern(pattern: &str) -> Result<RawRoute, ParseError> {
    let bytes = pattern.as_bytes();

    if bytes.is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::UnexpectedEndOfInput,
            pattern,
            0,
        ));
    }

    let mut steps: Vec<RawStep> = Vec::new();
    let mut seen_names: HashSet<String> = HashSet::new();
    let mut rest_parameter_seen = false;
    let mut cursor = 0usize;

    while cursor < bytes.len() {
        if rest_parameter_seen {
            return Err(ParseError::new(
                ParseErrorKind::TrailingAfterRestParameter,
                pattern,
                cursor,
            ));
        }

        if bytes[cursor] == b'{' {
            let (step, next_cursor) = parse_param(pattern, bytes, cursor, &mut seen_names)?;

            if let RawStep::Until {
                until: RawDelimiter::EndOfInput,
                ..
            }
            | RawStep::Regex {
                until: RawDelimiter::EndOfInput,
                ..
            } = &step
            {
                rest_parameter_seen = true;
            }

            steps.push(step);
            cursor = next_cursor;
        } else {
            let start = cursor;
            while cursor < bytes.len() && bytes[cursor] != b'{' {
                cursor += 1;
            }
            push_exact(&mut steps, &bytes[start..cursor]);
        }
    }

    Ok(RawRoute { steps })
}

/// Push a literal byte run, coalescing it into the previous step if that step was also
/// an [`RawStep::Exact`] (consecutive exact steps are always merged, per the data model).
fn push_exact(steps: &mut Vec<RawStep>, literal: &[u8]) {
    if literal.is_empty() {
        return;
    }

    match steps.last_mut() {
        Some(RawStep::Exact(existing)) => existing.extend_from_slice(literal),
        _ => steps.push(RawStep::Exact(literal.to_vec())),
    }
}

/// Parse a `{...}` parameter starting at `bytes[start] == b'{'`, returning the step and the
/// cursor position just past the closing `}`.
fn parse_param(
    pattern: &str,
    bytes: &[u8],
    start: usize,
    seen_names: &mut HashSet<String>,
) -> Result<(RawStep, usize), ParseError> {
    let mut cursor = start + 1;

    let name_start = cursor;
    while cursor < bytes.len() && is_name_continue_byte(bytes[cursor], cursor == name_start) {
        cursor += 1;
    }

    if cursor == name_start {
        return Err(ParseError::new(
            ParseErrorKind::EmptyParameterName,
            pattern,
            start,
        ));
    }

    let name = String::from_utf8_lossy(&bytes[name_start..cursor]).into_owned();

    if !seen_names.insert(name.clone()) {
        return Err(ParseError::new(
            ParseErrorKind::DuplicateParameterName(name),
            pattern,
            start,
        ));
    }

    if cursor >= bytes.len() {
        return Err(ParseError::new(
            ParseErrorKind::UnexpectedEndOfInput,
            pattern,
            cursor,
        ));
    }

    match bytes[cursor] {
        b'}' => Ok((
            RawStep::Until {
                name,
                until: RawDelimiter::Default,
            },
            cursor + 1,
        )),

        b':' => {
            cursor += 1;

            if cursor < bytes.len() && bytes[cursor] == b':' {
                // `{name::delim}`: until form with an explicit delimiter, no regex.
                cursor += 1;
                let (until, after_delim) = parse_delimiter(pattern, bytes, cursor)?;
                cursor = after_delim;
                expect_closing_brace(pattern, bytes, cursor)
                    .map(|end| (RawStep::Until { name, until }, end))
            } else {
                // `{name:regex}` or `{name:regex:delim}`.
                let (regex_text, after_regex) = parse_regex_text(pattern, bytes, cursor)?;
                cursor = after_regex;

                let until = if cursor < bytes.len() && bytes[cursor] == b':' {
                    cursor += 1;
                    let (until, after_delim) = parse_delimiter(pattern, bytes, cursor)?;
                    cursor = after_delim;
                    until
                } else {
                    RawDelimiter::Default
                };

                expect_closing_brace(pattern, bytes, cursor).map(|end| {
                    (
                        RawStep::Regex {
                            name,
                            pattern: regex_text,
                            until,
                        },
                        end,
                    )
                })
            }
        }

        _ => Err(ParseError::new(
            ParseErrorKind::UnbalancedBrace,
            pattern,
            cursor,
        )),
    }
}

fn is_name_continue_byte(b: u8, is_first: bool) -> bool {
    if is_first {
        b.is_ascii_alphabetic() || b == b'_'
    } else {
        b.is_ascii_alphanumeric() || b == b'_'
    }
}

/// Read bracket-balanced regex text, stopping at the first top-level `:` or `}`.
///
/// "Bracket-balanced" is tracked with a single depth counter shared across `(`, `[` and `{`
/// (the last to admit regex quantifiers like `{3}` without mistaking them for the closing
/// brace of the surrounding parameter).
fn parse_regex_text(
    pattern: &str,
    bytes: &[u8],
    start: usize,
) -> Result<(String, usize), ParseError> {
    let mut cursor = start;
    let mut depth: i32 = 0;

    loop {
        if cursor >= bytes.len() {
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedEndOfInput,
                pattern,
                cursor,
            ));
        }

        match bytes[cursor] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' => depth -= 1,
            b'}' if depth == 0 => break,
            b'}' => depth -= 1,
            b':' if depth == 0 => break,
            _ => {}
        }

        cursor += 1;
    }

    if cursor == start {
        return Err(ParseError::new(
            ParseErrorKind::InvalidRegex("empty regex".to_owned()),
            pattern,
            start,
        ));
    }

    let regex_text = String::from_utf8_lossy(&bytes[start..cursor]).into_owned();
    Ok((regex_text, cursor))
}

/// Read a single-byte delimiter, recognizing the `\n` escape as the end-of-input sentinel.
fn parse_delimiter(
    pattern: &str,
    bytes: &[u8],
    start: usize,
) -> Result<(RawDelimiter, usize), ParseError> {
    if start >= bytes.len() {
        return Err(ParseError::new(
            ParseErrorKind::UnexpectedEndOfInput,
            pattern,
            start,
        ));
    }

    if bytes[start] == b'\\' {
        if bytes.get(start + 1) == Some(&b'n') {
            return Ok((RawDelimiter::EndOfInput, start + 2));
        }

        return Err(ParseError::new(
            ParseErrorKind::UnbalancedBrace,
            pattern,
            start,
        ));
    }

    Ok((RawDelimiter::Byte(bytes[start]), start + 1))
}

fn expect_closing_brace(pattern: &str, bytes: &[u8], cursor: usize) -> Result<usize, ParseError> {
    if bytes.get(cursor) == Some(&b'}') {
        Ok(cursor + 1)
    } else {
        Err(ParseError::new(
            ParseErrorKind::UnbalancedBrace,
            pattern,
            cursor,
        ))
    }
}

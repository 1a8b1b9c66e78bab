//! Compiles a [`RawRoute`] produced by [`crate::parser`] into the final [`Step`]/[`Route`]
//! shapes used by the tree builder: the parser never touches `regex`, and this module never
//! touches byte cursors.

use regex::bytes::Regex;

use crate::error::{ParseError, ParseErrorKind};
use crate::parser::{RawDelimiter, RawRoute, RawStep};
use crate::route::{Delimiter, Route, Step};

/// Compile every raw step of `raw` into its final, regex-backed form.
///
/// `default_until` resolves any parameter that didn't specify its own delimiter
/// (see [`crate::RouterOptions::default_until`]).
pub fn compile_route(pattern: &str, raw: RawRoute, default_until: u8) -> Result<Route, ParseError> {
    let steps = raw
        .steps
        .into_iter()
        .map(|step| compile_step(pattern, step, default_until))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Route {
        steps,
        source: pattern.to_owned(),
    })
}

fn compile_step(pattern: &str, raw: RawStep, default_until: u8) -> Result<Step, ParseError> {
    match raw {
        RawStep::Exact(bytes) => Ok(Step::Exact(bytes)),

        RawStep::Until { name, until } => Ok(Step::Until {
            name,
            until: resolve_delimiter(until, default_until),
        }),

        RawStep::Regex {
            name,
            pattern: source,
            until,
        } => {
            let regex = compile_anchored_regex(pattern, &source)?;

            Ok(Step::Regex {
                name,
                source,
                regex,
                until: resolve_delimiter(until, default_until),
            })
        }
    }
}

fn resolve_delimiter(raw: RawDelimiter, default_until: u8) -> Delimiter {
    match raw {
        RawDelimiter::Byte(b) => Delimiter::Byte(b),
        RawDelimiter::Default => Delimiter::Byte(default_until),
        RawDelimiter::EndOfInput => Delimiter::EndOfInput,
    }
}

/// Anchor the user-supplied regex text at both ends so a capture can never match a subset of
/// the delimited span, then compile it against `regex::bytes` to avoid UTF-8 round-trips on
/// captured spans.
fn compile_anchored_regex(pattern: &str, source: &str) -> Result<Regex, ParseError> {
    let anchored = format!("^(?:{source})$");

    Regex::new(&anchored)
        .map_err(|err| ParseError::new(ParseErrorKind::InvalidRegex(err.to_string()), pattern, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_pattern;

    #[test]
    fn compiles_a_mixed_route() {
        let raw = parse_pattern("GET /users/{id:[0-9]+}").unwrap();
        let route = compile_route("GET /users/{id:[0-9]+}", raw, b'/').unwrap();
        assert_eq!(route.steps.len(), 2);
        assert!(route.steps[1].is_parametric());
    }

    #[test]
    fn default_delimiter_is_resolved() {
        let raw = parse_pattern("/users/{id}").unwrap();
        let route = compile_route("/users/{id}", raw, b'/').unwrap();
        assert_eq!(route.steps[1].until(), Some(Delimiter::Byte(b'/')));
    }

    #[test]
    fn rejects_unparsable_regex() {
        let raw = parse_pattern("/users/{id:(+)}").unwrap();
        let err = compile_route("/users/{id:(+)}", raw, b'/').unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidRegex(_)));
    }
}

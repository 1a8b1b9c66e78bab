//! Domain-level, fully-compiled route representation: [`Route`] is what the tree builder in
//! [`crate::tree`] actually inserts. Unlike [`crate::parser::RawRoute`], every delimiter has
//! been resolved against a [`crate::RouterOptions`] and every regex has been compiled.

use regex::bytes::Regex;

use crate::compiler;
use crate::error::ParseError;
use crate::parser;

/// A resolved parameter delimiter: either a literal byte or "consume the rest of the input"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Byte(u8),
    EndOfInput,
}

/// One compiled unit of a route, in the order it must be matched against the input
#[derive(Debug, Clone)]
pub enum Step {
    /// A literal byte run that must match exactly
    Exact(Vec<u8>),

    /// A named capture that runs until the delimiter (or the end of input)
    Until { name: String, until: Delimiter },

    /// A named capture constrained by an anchored regex, that also runs until the delimiter
    Regex {
        name: String,
        source: String,
        regex: Regex,
        until: Delimiter,
    },
}

impl Step {
    pub fn is_parametric(&self) -> bool {
        !matches!(self, Step::Exact(_))
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Step::Exact(_) => None,
            Step::Until { name, .. } | Step::Regex { name, .. } => Some(name),
        }
    }

    pub fn until(&self) -> Option<Delimiter> {
        match self {
            Step::Exact(_) => None,
            Step::Until { until, .. } | Step::Regex { until, .. } => Some(*until),
        }
    }

    /// Whether two parametric steps would occupy the same position in the tree with
    /// irreconcilably different shapes (name is deliberately excluded: two routes may bind
    /// the same position to differently-named parameters without conflicting).
    pub fn conflicts_with(&self, other: &Step) -> bool {
        match (self, other) {
            (Step::Until { until: a, .. }, Step::Until { until: b, .. }) => a != b,
            (
                Step::Regex {
                    source: a_src,
                    until: a_until,
                    ..
                },
                Step::Regex {
                    source: b_src,
                    until: b_until,
                    ..
                },
            ) => a_src != b_src || a_until != b_until,
            (Step::Until { .. }, Step::Regex { .. }) | (Step::Regex { .. }, Step::Until { .. }) => {
                true
            }
            (Step::Exact(_), _) | (_, Step::Exact(_)) => {
                unreachable!("conflicts_with is only called on parametric steps")
            }
        }
    }
}

/// A fully-parsed, fully-compiled route: the ordered steps a matching input must satisfy
#[derive(Debug, Clone)]
pub struct Route {
    pub steps: Vec<Step>,
    pub source: String,
}

impl Route {
    /// Parse and compile a pattern string into a [`Route`].
    ///
    /// `default_until` resolves any parameter that didn't specify its own delimiter
    /// (see [`crate::RouterOptions::default_until`]).
    pub fn parse(pattern: &str, default_until: u8) -> Result<Self, ParseError> {
        let raw = parser::parse_pattern(pattern)?;
        compiler::compile_route(pattern, raw, default_until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;

    #[test]
    fn parses_literal_and_parametric_steps() {
        let route = Route::parse("GET /users/{id}", b'/').unwrap();
        assert_eq!(route.steps.len(), 2);
        assert!(!route.steps[0].is_parametric());
        assert!(route.steps[1].is_parametric());
        assert_eq!(route.steps[1].name(), Some("id"));
        assert_eq!(route.steps[1].until(), Some(Delimiter::Byte(b'/')));
    }

    #[test]
    fn until_steps_with_same_delimiter_do_not_conflict() {
        let a = Route::parse("/users/{id}", b'/').unwrap();
        let b = Route::parse("/users/{name}", b'/').unwrap();
        assert!(!a.steps[1].conflicts_with(&b.steps[1]));
    }

    #[test]
    fn differing_delimiters_conflict() {
        let a = Route::parse("/files/{name::\\n}", b'/').unwrap();
        let b = Route::parse("/files/{name}", b'/').unwrap();
        assert!(a.steps[1].conflicts_with(&b.steps[1]));
    }

    #[test]
    fn regex_and_until_steps_conflict() {
        let a = Route::parse("/users/{id:[0-9]+}", b'/').unwrap();
        let b = Route::parse("/users/{id}", b'/').unwrap();
        assert!(a.steps[1].conflicts_with(&b.steps[1]));
    }

    #[test]
    fn regex_is_anchored_both_ends() {
        let route = Route::parse("/users/{id:[0-9]+}", b'/').unwrap();
        let Step::Regex { regex, .. } = &route.steps[1] else {
            panic!("expected a regex step");
        };
        assert!(regex.is_match(b"42"));
        assert!(!regex.is_match(b"42abc"));
        assert!(!regex.is_match(b"x42"));
    }

    #[test]
    fn invalid_regex_is_rejected() {
        let err = Route::parse("/users/{id:(+)}", b'/').unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidRegex(_)));
    }
}

use thiserror::Error;

/// The specific defect found while parsing a pattern string
///
/// See [`crate::Router::add`] for where these surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The pattern ended while a parameter or a bracket-balanced regex was still open
    UnexpectedEndOfInput,

    /// A `{}` or `{:...}` parameter carried no name
    EmptyParameterName,

    /// The same parameter name was used twice in one pattern
    DuplicateParameterName(String),

    /// A step followed a rest parameter (`{name::\n}`) in the same route
    TrailingAfterRestParameter,

    /// A `{` was never closed, or a `}` appeared with no matching `{`
    UnbalancedBrace,

    /// The regex text inside a parameter failed to compile
    InvalidRegex(String),
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedEndOfInput => write!(f, "unexpected end of input"),
            Self::EmptyParameterName => write!(f, "empty parameter name"),
            Self::DuplicateParameterName(name) => {
                write!(f, "duplicate parameter name '{name}'")
            }
            Self::TrailingAfterRestParameter => {
                write!(f, "no step may follow a rest parameter")
            }
            Self::UnbalancedBrace => write!(f, "unbalanced brace"),
            Self::InvalidRegex(msg) => write!(f, "invalid regex: {msg}"),
        }
    }
}

/// Failed to parse a pattern string into a [`crate::Route`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to parse pattern '{pattern}' at byte {position}: {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub pattern: String,
    pub position: usize,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, pattern: &str, position: usize) -> Self {
        Self {
            kind,
            pattern: pattern.to_owned(),
            position,
        }
    }
}

/// Two routes disagree on the shape of a parameter at the same position in the tree
///
/// Raised by [`crate::Router::add`] when tree insertion finds an existing parametric
/// child whose variant, delimiter, or regex text doesn't match the route being inserted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "pattern '{conflicting_pattern}' conflicts with already-registered pattern \
     '{existing_pattern}': both produce a parameter at the same position but with \
     incompatible shapes"
)]
pub struct ConflictError {
    pub existing_pattern: String,
    pub conflicting_pattern: String,
}

/// `compile()` could not produce a matcher
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// No destination ever registered a route, so there is nothing to match against
    #[error("cannot compile a router with no registered routes")]
    EmptyRouteSet,

    /// Tree construction found two routes disagreeing on the shape of a shared parameter
    #[error(transparent)]
    Conflict(#[from] ConflictError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_pattern_and_position() {
        let err = ParseError::new(ParseErrorKind::EmptyParameterName, "GET /{}", 5);
        let rendered = err.to_string();
        assert!(rendered.contains("GET /{}"));
        assert!(rendered.contains('5'));
        assert!(rendered.contains("empty parameter name"));
    }

    #[test]
    fn duplicate_parameter_name_is_carried_through() {
        let kind = ParseErrorKind::DuplicateParameterName("id".to_owned());
        assert_eq!(kind.to_string(), "duplicate parameter name 'id'");
    }
}

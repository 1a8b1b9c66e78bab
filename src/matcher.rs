//! The compiled matcher: an immutable, `Arc`-shared tree walked once per request with no
//! allocation on a miss and a single bounded allocation (the capture list spilling past its
//! inline capacity) on a match. Built once by [`crate::Router::compile`], then cloned cheaply
//! and shared across worker threads. Every candidate falls out of the tree's byte-keyed
//! children rather than being tried in sequence.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::route::{Delimiter, Step};
use crate::tree::Node;

/// A destination index stored at a tree terminal
pub(crate) type Leaf = u32;

/// The result of a successful match: the destination's payload, plus each parameter's
/// captured byte span in the order its step appears along the matched route.
#[derive(Debug, Clone)]
pub struct Match<'a, T> {
    pub payload: T,
    pub params: SmallVec<[&'a [u8]; 4]>,
}

/// A compiled, immutable matcher. Cheap to clone: cloning only bumps two `Arc` reference
/// counts, so a single compiled matcher can be shared across as many worker threads as the
/// host application runs.
pub struct Matcher<T> {
    root: Arc<Node<Leaf>>,
    payloads: Arc<Vec<T>>,
}

impl<T> Matcher<T> {
    pub(crate) fn new(root: Arc<Node<Leaf>>, payloads: Arc<Vec<T>>) -> Self {
        Matcher { root, payloads }
    }

    /// A human-readable dump of the underlying tree, for debugging and introspection.
    pub fn to_text(&self) -> String {
        self.root.to_text()
    }
}

impl<T: Clone> Matcher<T> {
    /// Match `input` (a full `METHOD PATH` byte string, or whatever the caller's routes were
    /// registered against) and return the destination's payload plus captured parameters.
    pub fn match_route<'a>(&self, input: &'a [u8]) -> Option<Match<'a, T>> {
        let mut params = SmallVec::new();
        let leaf = match_node(&self.root, input, &mut params)?;
        let payload = self.payloads.get(leaf as usize)?.clone();
        Some(Match { payload, params })
    }
}

impl<T> Clone for Matcher<T> {
    fn clone(&self) -> Self {
        Matcher {
            root: Arc::clone(&self.root),
            payloads: Arc::clone(&self.payloads),
        }
    }
}

/// Walk `node` against `input`, trying the exact child for the next byte before the parametric
/// child, and falling back to `node`'s own terminal only once `input` is exhausted. Backtracks
/// (truncating `params` back to its depth on entry) whenever a branch dead-ends, so a greedy
/// parametric match that turns out wrong doesn't leak a stale capture into the final result.
fn match_node<'a>(
    node: &Node<Leaf>,
    input: &'a [u8],
    params: &mut SmallVec<[&'a [u8]; 4]>,
) -> Option<Leaf> {
    let rest = input.strip_prefix(node.prefix())?;

    if let Some(&next_byte) = rest.first() {
        if let Some(child) = node.child_for(next_byte) {
            if let Some(leaf) = match_node(child, rest, params) {
                return Some(leaf);
            }
        }
    }

    if let (Some(step), Some(child)) = (node.parametric_step(), node.parametric_child()) {
        if let Some(captured) = try_consume(step, rest) {
            let depth = params.len();
            params.push(captured);

            if let Some(leaf) = match_node(child, &rest[captured.len()..], params) {
                return Some(leaf);
            }

            params.truncate(depth);
        }
    }

    if rest.is_empty() {
        return node.terminal();
    }

    None
}

/// Consume the span a parametric step would capture from the start of `input`: everything up
/// to (not including) its delimiter byte, or all of `input` for an end-of-input delimiter or a
/// delimiter byte that never occurs. A [`Step::Regex`] additionally rejects the span if it
/// doesn't satisfy the anchored pattern.
fn try_consume<'a>(step: &Step, input: &'a [u8]) -> Option<&'a [u8]> {
    let until = step.until().expect("parametric step always carries a delimiter");

    let end = match until {
        Delimiter::EndOfInput => input.len(),
        Delimiter::Byte(delim) => input.iter().position(|&b| b == delim).unwrap_or(input.len()),
    };

    let candidate = &input[..end];

    match step {
        Step::Regex { regex, .. } => regex.is_match(candidate).then_some(candidate),
        Step::Until { .. } => Some(candidate),
        Step::Exact(_) => unreachable!("try_consume is only called with parametric steps"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::Route;
    use crate::tree::Node as TreeNode;

    fn build(routes: &[(&str, &str)]) -> Matcher<String> {
        let mut root = TreeNode::<Leaf>::new();
        let mut payloads = Vec::new();

        for (index, (pattern, payload)) in routes.iter().enumerate() {
            let route = Route::parse(pattern, b'/').unwrap();
            root.insert(&route, index as Leaf).unwrap();
            payloads.push((*payload).to_owned());
        }

        Matcher::new(Arc::new(root), Arc::new(payloads))
    }

    #[test]
    fn matches_a_pure_literal_route() {
        let matcher = build(&[("GET /ping", "pong")]);
        let result = matcher.match_route(b"GET /ping").unwrap();
        assert_eq!(result.payload, "pong");
        assert!(result.params.is_empty());
    }

    #[test]
    fn captures_a_single_parameter() {
        let matcher = build(&[("GET /users/{id}", "user")]);
        let result = matcher.match_route(b"GET /users/42").unwrap();
        assert_eq!(result.payload, "user");
        assert_eq!(result.params.as_slice(), [b"42".as_slice()]);
    }

    #[test]
    fn allows_an_empty_capture() {
        let matcher = build(&[("GET /users/{id}", "user")]);
        let result = matcher.match_route(b"GET /users/").unwrap();
        assert_eq!(result.params.as_slice(), [b"".as_slice()]);
    }

    #[test]
    fn prefers_exact_over_parametric_at_the_same_position() {
        let matcher = build(&[("GET /users/me", "me"), ("GET /users/{id}", "user")]);
        let result = matcher.match_route(b"GET /users/me").unwrap();
        assert_eq!(result.payload, "me");
        assert!(result.params.is_empty());
    }

    #[test]
    fn regex_constrained_parameter_rejects_non_matching_input() {
        let matcher = build(&[("GET /users/{id:[0-9]+}", "numeric")]);
        assert!(matcher.match_route(b"GET /users/abc").is_none());
        let result = matcher.match_route(b"GET /users/42").unwrap();
        assert_eq!(result.payload, "numeric");
    }

    #[test]
    fn rest_parameter_captures_to_end_of_input() {
        let matcher = build(&[("GET /static/{path::\\n}", "asset")]);
        let result = matcher.match_route(b"GET /static/js/app.js").unwrap();
        assert_eq!(result.params.as_slice(), [b"js/app.js".as_slice()]);
    }

    #[test]
    fn two_parameter_route_captures_both_in_order() {
        let matcher = build(&[("GET /files/{name::.}.{ext}", "file")]);
        let result = matcher.match_route(b"GET /files/report.pdf").unwrap();
        assert_eq!(
            result.params.as_slice(),
            [b"report".as_slice(), b"pdf".as_slice()]
        );
    }

    #[test]
    fn no_match_allocates_no_captures() {
        let matcher = build(&[("GET /users/{id:[0-9]+}", "numeric")]);
        let result = matcher.match_route(b"GET /unknown");
        assert!(result.is_none());
    }
}

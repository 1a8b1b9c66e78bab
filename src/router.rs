//! The registry and build orchestration surface: [`Router`] accumulates destinations, builds
//! the tree lazily and memoizes it, and [`Router::compile`] hands off an immutable,
//! `Arc`-shared [`Matcher`] ready for concurrent use.

use std::sync::{Arc, OnceLock};

use crate::error::{CompileError, ConflictError, ParseError};
use crate::matcher::{Leaf, Matcher};
use crate::route::Route;
use crate::tree::Node;

/// Router-wide defaults applied to every route registered through [`Router::add`]
#[derive(Debug, Clone, Copy)]
pub struct RouterOptions {
    /// The delimiter byte a parameter captures up to when its pattern wrote none explicitly
    /// (the plain `{name}` and `{name:regex}` forms). Routers matching `METHOD PATH` strings
    /// typically want `b'/'` here, the default.
    pub default_until: u8,
}

impl Default for RouterOptions {
    fn default() -> Self {
        RouterOptions { default_until: b'/' }
    }
}

/// A registered destination: one or more route patterns (aliases that all resolve to the same
/// payload) plus the payload itself.
#[derive(Debug, Clone)]
pub struct Destination<T> {
    pub index: u32,
    pub routes: Vec<Route>,
    pub payload: T,
}

/// The mutable registry used to build a [`Matcher`].
///
/// Routes are parsed eagerly on [`Router::add`]/[`Router::add_many`], but the tree itself is
/// built lazily on first call to [`Router::tree`] or [`Router::compile`] and memoized. Adding
/// a further destination invalidates the cache so the next access rebuilds it.
pub struct Router<T> {
    options: RouterOptions,
    destinations: Vec<Destination<T>>,
    tree_cache: OnceLock<Result<Arc<Node<Leaf>>, ConflictError>>,
}

impl<T> Router<T> {
    pub fn new() -> Self {
        Self::with_options(RouterOptions::default())
    }

    pub fn with_options(options: RouterOptions) -> Self {
        Router {
            options,
            destinations: Vec::new(),
            tree_cache: OnceLock::new(),
        }
    }

    pub fn options(&self) -> RouterOptions {
        self.options
    }

    pub fn destinations(&self) -> &[Destination<T>] {
        &self.destinations
    }

    /// Register a single pattern as its own destination.
    pub fn add(&mut self, pattern: &str, payload: T) -> Result<u32, ParseError> {
        self.add_many(&[pattern], payload)
    }

    /// Register several pattern aliases that all resolve to the same destination.
    pub fn add_many(&mut self, patterns: &[&str], payload: T) -> Result<u32, ParseError> {
        let routes = patterns
            .iter()
            .map(|pattern| Route::parse(pattern, self.options.default_until))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self.add_destination(routes, payload))
    }

    /// Register a destination from already-compiled [`Route`]s, e.g. ones parsed against a
    /// different [`RouterOptions`] than this router's own.
    pub fn add_destination(&mut self, routes: Vec<Route>, payload: T) -> u32 {
        let index = self.destinations.len() as u32;
        self.destinations.push(Destination {
            index,
            routes,
            payload,
        });
        self.tree_cache = OnceLock::new();
        index
    }

    /// Build (or return the memoized) tree. Exposed for introspection independent of
    /// [`Router::compile`]; see [`Node::to_text`].
    pub fn tree(&self) -> Result<Arc<Node<Leaf>>, ConflictError> {
        self.tree_cache.get_or_init(|| self.build_tree()).clone()
    }

    fn build_tree(&self) -> Result<Arc<Node<Leaf>>, ConflictError> {
        let mut root = Node::new();

        for destination in &self.destinations {
            for route in &destination.routes {
                root.insert(route, destination.index)?;
            }
        }

        Ok(Arc::new(root))
    }
}

impl<T: Clone> Router<T> {
    /// Consume the router and produce an immutable, thread-safe [`Matcher`].
    pub fn compile(self) -> Result<Matcher<T>, CompileError> {
        if self.destinations.is_empty() {
            return Err(CompileError::EmptyRouteSet);
        }

        let tree = self.tree()?;
        let payloads = self
            .destinations
            .into_iter()
            .map(|destination| destination.payload)
            .collect::<Vec<_>>();

        Ok(Matcher::new(tree, Arc::new(payloads)))
    }
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiling_an_empty_router_fails() {
        let router: Router<&str> = Router::new();
        assert_eq!(router.compile().unwrap_err(), CompileError::EmptyRouteSet);
    }

    #[test]
    fn add_assigns_sequential_destination_indices() {
        let mut router = Router::new();
        let first = router.add("/a", "a").unwrap();
        let second = router.add("/b", "b").unwrap();
        assert_eq!(first, 0);
        assert_eq!(second, 1);
    }

    #[test]
    fn add_propagates_parse_errors() {
        let mut router: Router<&str> = Router::new();
        assert!(router.add("/a/{}", "a").is_err());
    }

    #[test]
    fn tree_reports_conflicts_without_blocking_further_additions() {
        let mut router = Router::new();
        router.add("/users/{id}", "by-id").unwrap();
        router.add("/users/{id:[0-9]+}", "by-numeric-id").unwrap();
        assert!(router.tree().is_err());
    }

    #[test]
    fn compile_surfaces_tree_conflicts() {
        let mut router = Router::new();
        router.add("/users/{id}", "by-id").unwrap();
        router.add("/users/{id:[0-9]+}", "by-numeric-id").unwrap();
        assert!(matches!(
            router.compile().unwrap_err(),
            CompileError::Conflict(_)
        ));
    }

    #[test]
    fn compiles_and_matches_a_registered_destination() {
        let mut router = Router::new();
        router.add("GET /users/{id}", "user-by-id").unwrap();
        let matcher = router.compile().unwrap();
        let result = matcher.match_route(b"GET /users/42").unwrap();
        assert_eq!(result.payload, "user-by-id");
        assert_eq!(result.params.as_slice(), [b"42".as_slice()]);
    }
}

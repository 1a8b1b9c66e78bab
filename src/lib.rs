//! radixroute builds a hybrid trie/radix tree over `METHOD PATH`-shaped route patterns and
//! compiles it into an immutable matcher, suitable for dispatching incoming requests to a
//! registered destination in one tree walk.
//!
//! # Examples
//!
//! ```rust
//! use radixroute::Router;
//!
//! let mut router = Router::new();
//! router.add("GET /users/{id}", "get_user").unwrap();
//! router.add("GET /users/{id}/posts/{post_id}", "get_user_post").unwrap();
//!
//! let matcher = router.compile().unwrap();
//!
//! let found = matcher.match_route(b"GET /users/42").unwrap();
//! assert_eq!(found.payload, "get_user");
//! assert_eq!(found.params.as_slice(), [b"42".as_slice()]);
//! ```
//!
//! # Syntax
//!
//! A pattern is a sequence of literal byte runs and `{...}` parameters:
//!
//! * `{name}`, capture up to the router's default delimiter (or the end of input)
//! * `{name:regex}`, as above, but the captured span must additionally match `regex`
//! * `{name:regex:delim}` / `{name::delim}`, capture up to the literal byte `delim`
//! * `{name::\n}` / `{name:regex:\n}`, capture the remainder of the input; no step may
//!   follow a parameter using this form
//!
//! See [`Router`] for registration and [`Matcher`] for the compiled matching API.

#![forbid(unsafe_code)]
#![forbid(unused_must_use)]
#![warn(unused_crate_dependencies)]

mod compiler;
mod error;
mod matcher;
mod parser;
mod route;
mod router;
mod tree;

pub use self::{
    error::{CompileError, ConflictError, ParseError, ParseErrorKind},
    matcher::{Match, Matcher},
    route::{Delimiter, Route, Step},
    router::{Destination, Router, RouterOptions},
    tree::Node,
};

//! # Router Module
//!
//! The router module holds the route tree and the resolver that walks it.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling route keys (`users`, `users/:id`, `:a/:b`, `files/*rest`) into matchers
//! - Building a nested route tree, either incrementally with `[parent]/child`
//!   references or from a whole [`RouteDef`] table
//! - Resolving a location level by level, running controllers and tracking which
//!   nodes are active so unchanged ancestors are not re-run
//! - Falling back to a not-found callback when nothing matches
//!
//! ## Architecture
//!
//! 1. **Compilation**: each key is compiled once, at registration, into a
//!    [`CompiledKey`] tagged with its [`KeyKind`].
//!
//! 2. **Resolution**: [`Router::resolve`] normalizes the location, then at every
//!    level picks the first sibling whose key matches the front of the remaining
//!    path, consumes that prefix and descends into the sibling's children.
//!
//! ## Example
//!
//! ```rust
//! use brrtnav::router::Router;
//! use brrtnav::RouterConfig;
//!
//! let mut router = Router::new(RouterConfig::default());
//! router.insert("files/*rest", |a| {
//!     println!("{:?}", a.params().get_segments("rest"));
//! }).unwrap();
//! router.register_not_found(|nf| eprintln!("no route for {}", nf.path()));
//!
//! router.resolve("#/files/a/b/c");
//! ```

mod core;
mod normalize;
mod pattern;
mod tree;

pub use self::core::{
    ConstructionStyle, NotFound, NotFoundHandler, Resolution, Router, MAX_QUEUED_NAVIGATIONS,
};
pub use normalize::{format_link, format_route};
pub use pattern::{CompiledKey, KeyKind, KeyMatch, ParamValue, RouteData};
pub use tree::{Activation, Controller, RouteDef, RouteNode, RouteSnapshot, RouteTree};

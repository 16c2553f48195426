//! # brrtnav
//!
//! **brrtnav** is a hierarchical path router for client-side navigation. It maps
//! location strings (hash fragments such as `#!/users/42` or history paths such
//! as `/app/users/42`) onto a tree of routes and runs each route's controller
//! as the tree is walked.
//!
//! ## Overview
//!
//! Routes form a tree. A location is matched one level at a time: the first
//! sibling whose key matches the front of the path wins, its prefix is consumed
//! and the rest of the path is handed to its children. Along the way the router
//! tracks which nodes are active, so a parent that is already on screen is not
//! re-entered when you navigate between two of its children.
//!
//! Keys come in four shapes:
//!
//! | Key | Matches | Parameters |
//! |-----|---------|------------|
//! | `users` | the literal text | none |
//! | `users/:id` | one segment per `:name` | `{ id: "42" }` |
//! | `:a/:b` | several parameters | one value per name |
//! | `files/*rest` | everything after the prefix | `{ rest: ["a", "b"] }` |
//!
//! ## Architecture
//!
//! - **[`router`]** - key compilation, the route tree and the resolver
//! - **[`runtime_config`]** - [`RouterConfig`], loaded from files, JSON values
//!   or the environment
//! - **[`manifest`]** - route tables declared in YAML, TOML or JSON
//! - **[`error`]** - [`RouterError`] for invalid construction and config
//! - **[`telemetry`]** - `tracing` subscriber setup for binaries
//! - **[`cli`]** - the `brrtnav` command-line driver
//!
//! ## Quick Start
//!
//! ```rust
//! use brrtnav::{Router, RouterConfig};
//!
//! let mut router = Router::new(RouterConfig::default());
//!
//! router.insert("home", |_| println!("home layout")).unwrap();
//! router.insert("[home]/profile", |_| println!("profile")).unwrap();
//! router.insert("users/:id", |a| {
//!     println!("user {:?}", a.params().get_str("id"));
//! }).unwrap();
//! router.register_not_found(|nf| eprintln!("nothing at {}", nf.remaining()));
//!
//! router.resolve("#!/home/profile");
//! router.resolve("#!/users/42");
//! ```
//!
//! ## Logging
//!
//! The library emits `tracing` events and never installs a subscriber. With
//! [`LoggingLevel::High`] the resolver traces every step at `debug` level;
//! misses are always reported at `warn`.

pub mod cli;
pub mod error;
pub mod manifest;
pub mod router;
pub mod runtime_config;
pub mod telemetry;

pub use error::{ErrorKind, RouterError};
pub use manifest::{load_manifest, RouteManifest};
pub use router::{
    format_link, format_route, Activation, NotFound, ParamValue, Resolution, RouteData,
    RouteDef, Router,
};
pub use runtime_config::{LoggingLevel, RouterConfig};

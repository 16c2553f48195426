//! # CLI Module
//!
//! Command-line driver for exercising a route table without a host
//! application.
//!
//! ## Commands
//!
//! ### `resolve`
//!
//! Resolve locations in order against a manifest and print what ran:
//!
//! ```bash
//! brrtnav resolve --manifest routes.yaml '#!/home' '#!/home/profile'
//! ```
//!
//! Each activated controller prints `activate <key> <params>`; a miss prints
//! `not-found <remaining> (<path>)`.
//!
//! ### `routes`
//!
//! Print the route tree snapshot:
//!
//! ```bash
//! brrtnav routes --manifest routes.yaml --format yaml
//! ```
//!
//! ### `normalize`
//!
//! Show what a location normalizes to:
//!
//! ```bash
//! brrtnav normalize --base-path /app /app/#!/about
//! ```
//!
//! Logging goes to stderr and is configured with `BRRTNAV_LOG_*` variables
//! (see [`crate::telemetry`]).

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{
    normalize_locations, render_routes, resolve_locations, run_cli, Cli, Commands, OutputFormat,
};

//! Errors raised while building a route tree or configuring a [`Router`](crate::router::Router).
//!
//! Resolution never fails: a path that matches nothing is reported through the
//! not-found fallback and [`Resolution::NotFound`](crate::router::Resolution::NotFound),
//! so everything in this module is a registration-time problem.

use std::fmt;

use crate::router::ConstructionStyle;

/// Coarse classification of a [`RouterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller handed the router something it cannot register.
    InvalidConfiguration,
    /// A `[parent]` reference did not lead to an existing route node.
    MalformedParentReference,
}

/// Registration and configuration error
///
/// Returned synchronously from [`Router::insert`](crate::router::Router::insert),
/// [`Router::map`](crate::router::Router::map) and the configuration loaders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// The path spec was empty, or its child segment after `[parent]` was empty.
    EmptyPath {
        /// The offending path spec as passed in
        path_spec: String,
    },
    /// Both `map()` and `insert()` were used on the same router.
    MixedConstruction {
        /// Style recorded by the first construction call
        existing: ConstructionStyle,
        /// Style of the rejected call
        attempted: ConstructionStyle,
    },
    /// The bracketed parent path matched no node in the tree.
    MalformedParentReference {
        /// Contents of the brackets
        parent: String,
        /// The full path spec being inserted
        path_spec: String,
    },
    /// A route key could not be compiled into a matcher.
    InvalidPattern {
        /// The raw route key
        key: String,
        /// Compiler message
        reason: String,
    },
    /// A configuration value was rejected.
    InvalidConfig {
        /// What was wrong with it
        reason: String,
    },
}

impl RouterError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            RouterError::MalformedParentReference { .. } => ErrorKind::MalformedParentReference,
            _ => ErrorKind::InvalidConfiguration,
        }
    }
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::EmptyPath { path_spec } => {
                write!(
                    f,
                    "Invalid route configuration: path '{}' does not name a route. \
                    Define the route to register.",
                    path_spec
                )
            }
            RouterError::MixedConstruction {
                existing,
                attempted,
            } => {
                write!(
                    f,
                    "Invalid route configuration: cannot use {} construction after {} construction \
                    on the same router.",
                    attempted, existing
                )
            }
            RouterError::MalformedParentReference { parent, path_spec } => {
                write!(
                    f,
                    "Malformed parent reference: '[{}]' in '{}' does not match a registered route.",
                    parent, path_spec
                )
            }
            RouterError::InvalidPattern { key, reason } => {
                write!(f, "Invalid route key '{}': {}", key, reason)
            }
            RouterError::InvalidConfig { reason } => {
                write!(f, "Invalid router configuration: {}", reason)
            }
        }
    }
}

impl std::error::Error for RouterError {}

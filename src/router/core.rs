//! Router core: tree construction and path resolution.
//!
//! [`Router::resolve`] walks the tree one level at a time. At each level the
//! first sibling whose key matches the front of the remaining path wins, the
//! matched prefix is consumed, and every other sibling (with its subtree) is
//! deactivated.
//!
//! Controllers run on two occasions:
//!
//! - an ancestor runs when it is entered and was not already active, so a
//!   layout controller runs once per activation chain
//! - the leaf always runs, so revisiting the same leaf with new parameters
//!   refreshes it
//!
//! When a level has nothing that matches, or the path outlives the tree, the
//! not-found fallback fires and resolution stops.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::normalize::{format_link, format_route};
use super::pattern::CompiledKey;
use super::tree::{
    trim_separators, Activation, Controller, RouteDef, RouteNode, RouteSnapshot, RouteTree,
};
use crate::error::RouterError;
use crate::runtime_config::{LoggingLevel, RouterConfig};

/// Follow-up navigations queued by controllers that one `resolve` call will run.
pub const MAX_QUEUED_NAVIGATIONS: usize = 16;

/// Callback for paths that match nothing
pub type NotFoundHandler = Arc<dyn Fn(&NotFound<'_>) + Send + Sync>;

/// Which API built the route tree
///
/// The first construction call records its style; the other style is rejected
/// from then on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConstructionStyle {
    #[default]
    Unset,
    /// [`Router::map`]
    Map,
    /// [`Router::insert`]
    Incremental,
}

impl fmt::Display for ConstructionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructionStyle::Unset => f.write_str("no"),
            ConstructionStyle::Map => f.write_str("map()"),
            ConstructionStyle::Incremental => f.write_str("insert()"),
        }
    }
}

/// What the not-found callback sees
pub struct NotFound<'a> {
    remaining: &'a str,
    path: &'a str,
    navigator: &'a Navigator,
}

impl<'a> NotFound<'a> {
    /// The part of the path that could not be matched
    #[must_use]
    pub fn remaining(&self) -> &'a str {
        self.remaining
    }

    /// The full (normalized) path being resolved
    #[must_use]
    pub fn path(&self) -> &'a str {
        self.path
    }

    /// Queue a navigation, typically to an error route.
    pub fn navigate(&self, location: impl Into<String>) {
        self.navigator.push(location.into());
    }
}

impl fmt::Debug for NotFound<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotFound")
            .field("remaining", &self.remaining)
            .field("path", &self.path)
            .finish()
    }
}

/// Navigations requested from inside callbacks during a resolution
#[derive(Default)]
pub(crate) struct Navigator {
    queue: RefCell<VecDeque<String>>,
}

impl Navigator {
    pub(crate) fn push(&self, location: String) {
        self.queue.borrow_mut().push_back(location);
    }

    fn pop(&self) -> Option<String> {
        self.queue.borrow_mut().pop_front()
    }

    fn drain(&self) -> usize {
        let mut queue = self.queue.borrow_mut();
        let dropped = queue.len();
        queue.clear();
        dropped
    }
}

/// Outcome of a resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A leaf matched; `chain` holds the matched keys from the root down
    Matched { chain: Vec<String> },
    /// Resolution stopped at `remaining`
    NotFound { remaining: String },
}

impl Resolution {
    #[must_use]
    pub fn is_matched(&self) -> bool {
        matches!(self, Resolution::Matched { .. })
    }
}

/// Hierarchical path router
///
/// Owns one route tree and its activation state. Build the tree with either
/// [`insert`](Router::insert) or [`map`](Router::map), then feed locations to
/// [`resolve`](Router::resolve).
///
/// ```
/// use brrtnav::router::Router;
/// use brrtnav::RouterConfig;
///
/// let mut router = Router::new(RouterConfig::default());
/// router.insert("home", |_| println!("home layout")).unwrap();
/// router
///     .insert("[home]/users/:id", |a| println!("user {:?}", a.params().get_str("id")))
///     .unwrap();
///
/// assert!(router.resolve("#!/home/users/42").is_matched());
/// ```
pub struct Router {
    config: RouterConfig,
    routes: RouteTree,
    style: ConstructionStyle,
    not_found: Option<NotFoundHandler>,
}

impl Router {
    /// Create an empty router.
    #[must_use]
    pub fn new(config: RouterConfig) -> Self {
        if config.debug {
            info!(
                base_path = %config.base_path,
                use_history_mode = config.use_history_mode,
                logging_level = %config.logging_level,
                "brrtnav router running in debug mode; set DEBUG=false in its config to silence it"
            );
        }
        Self {
            config,
            routes: RouteTree::default(),
            style: ConstructionStyle::Unset,
            not_found: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Register a route.
    ///
    /// `path_spec` is either a top-level key (`"about"`, `"#!/about"`) or a
    /// nested one with its parent in brackets (`"[users/:id]/posts"`). The
    /// parent must already be registered.
    ///
    /// # Errors
    ///
    /// - [`RouterError::EmptyPath`] for an empty spec or an empty child key
    /// - [`RouterError::MixedConstruction`] if [`map`](Router::map) was used
    /// - [`RouterError::MalformedParentReference`] if the parent is not found
    pub fn insert<F>(&mut self, path_spec: &str, controller: F) -> Result<(), RouterError>
    where
        F: Fn(&Activation<'_>) + Send + Sync + 'static,
    {
        self.insert_controller(path_spec, Arc::new(controller))
    }

    /// [`insert`](Router::insert) for an already shared controller.
    pub fn insert_controller(
        &mut self,
        path_spec: &str,
        controller: Controller,
    ) -> Result<(), RouterError> {
        if path_spec.is_empty() {
            return Err(RouterError::EmptyPath {
                path_spec: path_spec.to_string(),
            });
        }
        self.check_style(ConstructionStyle::Incremental)?;

        match parent_reference(path_spec) {
            Some((parent, child)) => {
                let child = trim_separators(child);
                if child.is_empty() {
                    return Err(RouterError::EmptyPath {
                        path_spec: path_spec.to_string(),
                    });
                }
                let node = RouteNode::new(CompiledKey::compile(child)?, controller);
                let parent_node = self.routes.locate_mut(parent).ok_or_else(|| {
                    RouterError::MalformedParentReference {
                        parent: parent.to_string(),
                        path_spec: path_spec.to_string(),
                    }
                })?;
                debug!(parent = %parent, key = %child, "Nested route registered");
                parent_node
                    .children
                    .get_or_insert_with(RouteTree::default)
                    .upsert(node);
            }
            None => {
                let key = format_route(path_spec, &self.config.base_path);
                let node = RouteNode::new(CompiledKey::compile(&key)?, controller);
                debug!(key = %key, "Route registered");
                self.routes.upsert(node);
            }
        }
        self.style = ConstructionStyle::Incremental;
        Ok(())
    }

    /// Register a whole table of routes at the root, keys taken verbatim.
    ///
    /// # Errors
    ///
    /// - [`RouterError::MixedConstruction`] if [`insert`](Router::insert) was used
    /// - [`RouterError::EmptyPath`] for an empty key anywhere in the table
    pub fn map<I, K>(&mut self, routes: I) -> Result<(), RouterError>
    where
        I: IntoIterator<Item = (K, RouteDef)>,
        K: AsRef<str>,
    {
        self.check_style(ConstructionStyle::Map)?;
        let nodes = routes
            .into_iter()
            .map(|(key, def)| def.into_node(key.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        self.style = ConstructionStyle::Map;
        for node in nodes {
            self.routes.upsert(node);
        }
        info!(routes_count = self.routes.len(), "Routing table mapped");
        Ok(())
    }

    /// Reject `style` if the tree was already built the other way.
    fn check_style(&self, style: ConstructionStyle) -> Result<(), RouterError> {
        match self.style {
            ConstructionStyle::Unset => Ok(()),
            existing if existing == style => Ok(()),
            existing => Err(RouterError::MixedConstruction {
                existing,
                attempted: style,
            }),
        }
    }

    /// Set the callback run whenever a path cannot be resolved.
    pub fn register_not_found<F>(&mut self, callback: F)
    where
        F: Fn(&NotFound<'_>) + Send + Sync + 'static,
    {
        self.not_found = Some(Arc::new(callback));
    }

    /// Deep copy of the route tree and its activation state.
    #[must_use]
    pub fn routes(&self) -> Vec<RouteSnapshot> {
        self.routes.snapshot()
    }

    /// Keys of the currently active chain, root to leaf.
    #[must_use]
    pub fn active_chain(&self) -> Vec<String> {
        self.routes.active_chain()
    }

    /// [`format_route`] with this router's base path.
    #[must_use]
    pub fn format_route(&self, location: &str) -> String {
        format_route(location, &self.config.base_path)
    }

    /// [`format_link`] with this router's base path.
    #[must_use]
    pub fn format_link(&self, href: &str, origin: &str) -> Option<String> {
        format_link(href, origin, &self.config.base_path)
    }

    /// Resolve a location, running controllers along the matched chain.
    ///
    /// The location is normalized first. Navigations queued by controllers
    /// through [`Activation::navigate`] run afterwards in order; the returned
    /// [`Resolution`] is that of the last path processed.
    pub fn resolve(&mut self, location: &str) -> Resolution {
        let navigator = Navigator::default();
        let path = self.format_route(location);
        let mut resolution = self.resolve_path(&path, &navigator);

        let mut hops = 0;
        while let Some(next) = navigator.pop() {
            if hops == MAX_QUEUED_NAVIGATIONS {
                let dropped = navigator.drain() + 1;
                warn!(
                    path = %path,
                    dropped,
                    limit = MAX_QUEUED_NAVIGATIONS,
                    "Queued navigation limit reached"
                );
                break;
            }
            hops += 1;
            let next = self.format_route(&next);
            if self.config.logging_level == LoggingLevel::High && self.config.debug {
                debug!(from = %path, to = %next, "Running queued navigation");
            }
            resolution = self.resolve_path(&next, &navigator);
        }
        resolution
    }

    fn resolve_path(&mut self, path: &str, navigator: &Navigator) -> Resolution {
        let trace = self.config.debug && self.config.logging_level == LoggingLevel::High;
        let not_found = self.not_found.clone();
        let fallback = |remaining: &str| {
            if let Some(callback) = &not_found {
                callback(&NotFound {
                    remaining,
                    path,
                    navigator,
                });
            }
            warn!(remaining = %remaining, path = %path, "Route not found");
            Resolution::NotFound {
                remaining: remaining.to_string(),
            }
        };

        let mut level = &mut self.routes;
        let mut remaining = path;
        let mut chain = Vec::new();

        if remaining.is_empty() {
            return fallback(remaining);
        }

        loop {
            let Some((index, matched)) = level.find_match(remaining) else {
                level.deactivate_all();
                return fallback(remaining);
            };

            remaining = trim_separators(&remaining[matched.len..]);
            let terminal = remaining.is_empty();
            if trace && level.len() > 1 {
                debug!(
                    key = level.iter().nth(index).map_or("", RouteNode::key),
                    siblings = level.len() - 1,
                    "Deactivating siblings"
                );
            }
            level.deactivate_siblings(index);

            let node = level.node_mut(index);
            chain.push(node.key.raw().to_string());

            if terminal {
                node.route_data = matched.data;
                node.active = true;
                node.deactivate_descendants();
                if trace {
                    debug!(key = %node.key, params = ?node.route_data, "Activating leaf route");
                }
                invoke(node, path, true, navigator);
                return Resolution::Matched { chain };
            }

            if !node.active {
                node.route_data = matched.data;
                node.active = true;
                if trace {
                    debug!(key = %node.key, params = ?node.route_data, "Activating parent route");
                }
                invoke(node, path, false, navigator);
            } else if trace {
                debug!(key = %node.key, "Parent route already active");
            }

            match node.children.as_mut() {
                Some(children) => level = children,
                None => return fallback(remaining),
            }
        }
    }
}

fn invoke(node: &RouteNode, path: &str, terminal: bool, navigator: &Navigator) {
    (node.controller)(&Activation {
        key: node.key.raw(),
        data: &node.route_data,
        path,
        terminal,
        navigator,
    });
}

/// Split `"[parent]/child"` into its parent reference and child part.
fn parent_reference(path_spec: &str) -> Option<(&str, &str)> {
    let open = path_spec.find('[')?;
    let close = path_spec.find(']')?;
    if close < open {
        return None;
    }
    Some((&path_spec[open + 1..close], &path_spec[close + 1..]))
}

impl Default for Router {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("config", &self.config)
            .field("routes", &self.routes)
            .field("style", &self.style)
            .field("not_found", &self.not_found.is_some())
            .finish()
    }
}

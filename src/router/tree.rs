//! Route tree storage and the active-state cache
//!
//! A [`RouteTree`] is one level of routing: an ordered list of sibling
//! [`RouteNode`]s, each of which may own a nested tree. Siblings are kept in
//! registration order because the resolver takes the first one that matches.
//!
//! The `active` flag on each node is the activation cache. Invalidation is a
//! plain recursive walk; trees are small enough that a generation counter is
//! not worth its bookkeeping.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use super::pattern::{CompiledKey, KeyKind, KeyMatch, RouteData};
use crate::error::RouterError;

/// Handler invoked when a route node is activated
pub type Controller = Arc<dyn Fn(&Activation<'_>) + Send + Sync>;

/// What a controller sees when it runs
pub struct Activation<'a> {
    pub(crate) key: &'a str,
    pub(crate) data: &'a RouteData,
    pub(crate) path: &'a str,
    pub(crate) terminal: bool,
    pub(crate) navigator: &'a super::core::Navigator,
}

impl<'a> Activation<'a> {
    /// Route key of the node being activated
    #[must_use]
    pub fn key(&self) -> &'a str {
        self.key
    }

    /// Parameters extracted for this node
    #[must_use]
    pub fn params(&self) -> &'a RouteData {
        self.data
    }

    /// The full (normalized) path being resolved
    #[must_use]
    pub fn path(&self) -> &'a str {
        self.path
    }

    /// `true` when this node is the matched leaf, `false` for an ancestor
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Queue a navigation to run once the current resolution has finished.
    pub fn navigate(&self, location: impl Into<String>) {
        self.navigator.push(location.into());
    }
}

impl fmt::Debug for Activation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activation")
            .field("key", &self.key)
            .field("params", &self.data)
            .field("path", &self.path)
            .field("terminal", &self.terminal)
            .finish()
    }
}

/// One routable unit in the tree
#[derive(Clone)]
pub struct RouteNode {
    pub(crate) key: CompiledKey,
    pub(crate) controller: Controller,
    pub(crate) route_data: RouteData,
    pub(crate) active: bool,
    pub(crate) children: Option<RouteTree>,
}

impl RouteNode {
    pub(crate) fn new(key: CompiledKey, controller: Controller) -> Self {
        Self {
            key,
            controller,
            route_data: RouteData::default(),
            active: false,
            children: None,
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        self.key.raw()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Parameters recorded on the node's last activation
    #[must_use]
    pub fn route_data(&self) -> &RouteData {
        &self.route_data
    }

    #[must_use]
    pub fn children(&self) -> Option<&RouteTree> {
        self.children.as_ref()
    }

    /// Clear `active` on this node's whole subtree, leaving the node itself alone.
    pub(crate) fn deactivate_descendants(&mut self) {
        if let Some(children) = self.children.as_mut() {
            children.deactivate_all();
        }
    }

    fn snapshot(&self) -> RouteSnapshot {
        RouteSnapshot {
            key: self.key.raw().to_string(),
            kind: self.key.kind().clone(),
            active: self.active,
            route_data: self.route_data.clone(),
            children: self
                .children
                .as_ref()
                .map(RouteTree::snapshot)
                .unwrap_or_default(),
        }
    }
}

impl fmt::Debug for RouteNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteNode")
            .field("key", &self.key.raw())
            .field("active", &self.active)
            .field("route_data", &self.route_data)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

/// One level of the routing tree
#[derive(Clone, Default, Debug)]
pub struct RouteTree {
    nodes: Vec<RouteNode>,
}

impl RouteTree {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteNode> {
        self.nodes.iter()
    }

    /// Find a direct child by its raw key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RouteNode> {
        self.nodes.iter().find(|n| n.key.raw() == key)
    }

    pub(crate) fn node_mut(&mut self, index: usize) -> &mut RouteNode {
        &mut self.nodes[index]
    }

    /// Insert a node, replacing any sibling with the same key in place.
    pub(crate) fn upsert(&mut self, node: RouteNode) {
        match self.nodes.iter().position(|n| n.key.raw() == node.key.raw()) {
            Some(index) => self.nodes[index] = node,
            None => self.nodes.push(node),
        }
    }

    /// First sibling, in registration order, whose key matches the front of `path`.
    pub(crate) fn find_match(&self, path: &str) -> Option<(usize, KeyMatch)> {
        self.nodes
            .iter()
            .enumerate()
            .find_map(|(index, node)| node.key.match_prefix(path).map(|m| (index, m)))
    }

    /// Deactivate every node at this level and below.
    pub(crate) fn deactivate_all(&mut self) {
        for node in &mut self.nodes {
            node.active = false;
            node.deactivate_descendants();
        }
    }

    /// Deactivate every sibling except `keep`, together with their subtrees.
    pub(crate) fn deactivate_siblings(&mut self, keep: usize) {
        for (index, node) in self.nodes.iter_mut().enumerate() {
            if index != keep {
                node.active = false;
                node.deactivate_descendants();
            }
        }
    }

    /// Walk a `[parent]` reference down the tree.
    ///
    /// Each level is tried literally against the raw keys first, then through
    /// the compiled matcher, consuming what matched until the reference is used up.
    pub(crate) fn locate_mut(&mut self, reference: &str) -> Option<&mut RouteNode> {
        let mut level = self;
        let mut rest = trim_separators(reference);
        if rest.is_empty() {
            return None;
        }

        loop {
            let (index, len) = level.match_reference(rest)?;
            rest = trim_separators(&rest[len..]);
            if rest.is_empty() {
                return Some(&mut level.nodes[index]);
            }
            level = level.nodes[index].children.as_mut()?;
        }
    }

    fn match_reference(&self, reference: &str) -> Option<(usize, usize)> {
        let literal = self.nodes.iter().enumerate().find_map(|(index, node)| {
            let raw = node.key.raw();
            (!raw.is_empty() && reference.starts_with(raw)).then_some((index, raw.len()))
        });
        literal.or_else(|| {
            self.nodes.iter().enumerate().find_map(|(index, node)| {
                node.key
                    .match_prefix(reference)
                    .filter(|m| m.len > 0)
                    .map(|m| (index, m.len))
            })
        })
    }

    /// Keys of the active chain, root to leaf.
    pub(crate) fn active_chain(&self) -> Vec<String> {
        let mut chain = Vec::new();
        let mut level = Some(self);
        while let Some(tree) = level {
            match tree.nodes.iter().find(|n| n.active) {
                Some(node) => {
                    chain.push(node.key.raw().to_string());
                    level = node.children.as_ref();
                }
                None => level = None,
            }
        }
        chain
    }

    /// Deep, read-only copy of this level.
    #[must_use]
    pub fn snapshot(&self) -> Vec<RouteSnapshot> {
        self.nodes.iter().map(RouteNode::snapshot).collect()
    }
}

/// Serializable copy of a route node and its subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSnapshot {
    pub key: String,
    pub kind: KeyKind,
    pub active: bool,
    pub route_data: RouteData,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RouteSnapshot>,
}

impl RouteSnapshot {
    /// Find a direct child snapshot by key.
    #[must_use]
    pub fn child(&self, key: &str) -> Option<&RouteSnapshot> {
        self.children.iter().find(|c| c.key == key)
    }
}

/// Route definition for [`Router::map`](super::Router::map)
///
/// Describes a node and its nested children in one value.
#[derive(Clone)]
pub struct RouteDef {
    controller: Controller,
    children: Vec<(String, RouteDef)>,
}

impl RouteDef {
    pub fn new<F>(controller: F) -> Self
    where
        F: Fn(&Activation<'_>) + Send + Sync + 'static,
    {
        Self {
            controller: Arc::new(controller),
            children: Vec::new(),
        }
    }

    /// Add a nested route under this one.
    #[must_use]
    pub fn child(mut self, key: impl Into<String>, def: RouteDef) -> Self {
        self.children.push((key.into(), def));
        self
    }

    pub(crate) fn into_node(self, key: &str) -> Result<RouteNode, RouterError> {
        if key.is_empty() {
            return Err(RouterError::EmptyPath {
                path_spec: key.to_string(),
            });
        }
        let mut node = RouteNode::new(CompiledKey::compile(key)?, self.controller);
        if !self.children.is_empty() {
            let mut tree = RouteTree::default();
            for (child_key, child) in self.children {
                tree.upsert(child.into_node(&child_key)?);
            }
            node.children = Some(tree);
        }
        Ok(node)
    }
}

impl fmt::Debug for RouteDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDef")
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

/// Strip one leading and one trailing `/`.
pub(crate) fn trim_separators(path: &str) -> &str {
    let path = path.strip_prefix('/').unwrap_or(path);
    path.strip_suffix('/').unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(key: &str) -> RouteNode {
        RouteNode::new(
            CompiledKey::compile(key).unwrap(),
            Arc::new(|_: &Activation<'_>| {}),
        )
    }

    fn tree_of(keys: &[&str]) -> RouteTree {
        let mut tree = RouteTree::default();
        for key in keys {
            tree.upsert(node(key));
        }
        tree
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut tree = tree_of(&["a", "b", "c"]);
        let mut replacement = node("b");
        replacement.active = true;
        tree.upsert(replacement);

        let keys: Vec<_> = tree.iter().map(RouteNode::key).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert!(tree.get("b").unwrap().is_active());
    }

    #[test]
    fn test_find_match_prefers_registration_order() {
        let tree = tree_of(&[":any", "about"]);
        let (index, m) = tree.find_match("about").unwrap();
        assert_eq!(index, 0);
        assert_eq!(m.data.get_str("any"), Some("about"));
    }

    #[test]
    fn test_deactivate_siblings_clears_subtrees() {
        let mut tree = tree_of(&["a", "b"]);
        let mut child = tree_of(&["x"]);
        child.node_mut(0).active = true;
        tree.node_mut(1).children = Some(child);
        tree.node_mut(0).active = true;
        tree.node_mut(1).active = true;

        tree.deactivate_siblings(0);

        assert!(tree.get("a").unwrap().is_active());
        let b = tree.get("b").unwrap();
        assert!(!b.is_active());
        assert!(!b.children().unwrap().get("x").unwrap().is_active());
    }

    #[test]
    fn test_locate_walks_nested_levels() {
        let mut tree = tree_of(&["home"]);
        tree.node_mut(0).children = Some(tree_of(&["users/:id"]));

        let found = tree.locate_mut("home/users/:id").unwrap();
        assert_eq!(found.key(), "users/:id");
        assert!(tree.locate_mut("home/missing").is_none());
        assert!(tree.locate_mut("").is_none());
    }

    #[test]
    fn test_locate_falls_back_to_compiled_match() {
        let mut tree = tree_of(&["users/:id"]);
        assert_eq!(tree.locate_mut("users/42").unwrap().key(), "users/:id");
    }

    #[test]
    fn test_trim_separators_strips_one_each_side() {
        assert_eq!(trim_separators("/a/b/"), "a/b");
        assert_eq!(trim_separators("//a"), "/a");
        assert_eq!(trim_separators(""), "");
    }

    #[test]
    fn test_route_def_builds_nested_nodes() {
        let def = RouteDef::new(|_| {}).child("profile", RouteDef::new(|_| {}));
        let node = def.into_node("home").unwrap();
        assert_eq!(node.key(), "home");
        assert!(node.children().unwrap().get("profile").is_some());
    }
}

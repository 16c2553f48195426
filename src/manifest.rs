//! Declarative route manifests
//!
//! A manifest lists route specs in registration order, plus optional router
//! configuration, so a route table can live in a file:
//!
//! ```yaml
//! config:
//!   basePath: /app
//!   loggingLevel: high
//! routes:
//!   - home
//!   - "[home]/profile"
//!   - users/:id
//!   - files/*rest
//! ```
//!
//! YAML, TOML and JSON are accepted, chosen by file extension.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::router::{Controller, Router};
use crate::runtime_config::{read_structured, RouterConfig};

/// Route table loaded from a file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteManifest {
    /// Merged over [`RouterConfig::default`]
    #[serde(default)]
    pub config: Value,
    /// Path specs, registered in order with [`Router::insert`]
    #[serde(default)]
    pub routes: Vec<String>,
}

impl RouteManifest {
    /// The manifest's configuration on top of `base`.
    pub fn router_config(&self, base: RouterConfig) -> anyhow::Result<RouterConfig> {
        let mut config = base;
        config
            .merge(self.config.clone())
            .context("invalid manifest config")?;
        Ok(config)
    }

    /// Build a router, asking `controller_for` for each route's controller.
    pub fn build_router<F>(&self, config: RouterConfig, controller_for: F) -> anyhow::Result<Router>
    where
        F: FnMut(&str) -> Controller,
    {
        let mut router = Router::new(self.router_config(config)?);
        self.register_routes(&mut router, controller_for)?;
        Ok(router)
    }

    /// Insert this manifest's routes, in order, into an existing router.
    ///
    /// The manifest's `config` is not applied.
    pub fn register_routes<F>(&self, router: &mut Router, mut controller_for: F) -> anyhow::Result<()>
    where
        F: FnMut(&str) -> Controller,
    {
        for spec in &self.routes {
            router
                .insert_controller(spec, controller_for(spec))
                .with_context(|| format!("failed to register route '{spec}'"))?;
        }
        Ok(())
    }
}

/// Load a manifest from a YAML, TOML or JSON file.
pub fn load_manifest(path: impl AsRef<Path>) -> anyhow::Result<RouteManifest> {
    let path = path.as_ref();
    let value = read_structured(path)?;
    serde_json::from_value(value)
        .with_context(|| format!("invalid route manifest {}", path.display()))
}

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::manifest::{load_manifest, RouteManifest};
use crate::router::{format_route, Activation, Controller, Resolution, Router};
use crate::runtime_config::RouterConfig;
use crate::telemetry;

/// Command-line interface for brrtnav
#[derive(Parser)]
#[command(name = "brrtnav")]
#[command(about = "brrtnav route tree CLI", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve locations against a route manifest, in order
    Resolve {
        /// Route manifest (YAML, TOML or JSON)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Override the manifest's base path
        #[arg(long, env = "BRRTNAV_BASE_PATH")]
        base_path: Option<String>,

        /// Locations to resolve (hash fragments or paths)
        #[arg(required = true)]
        locations: Vec<String>,
    },
    /// Print the route tree of a manifest
    Routes {
        /// Route manifest (YAML, TOML or JSON)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Print the normalized form of locations
    Normalize {
        /// Base path to strip
        #[arg(long, default_value = "")]
        base_path: String,

        /// Locations to normalize
        #[arg(required = true)]
        locations: Vec<String>,
    },
}

/// Output format for `routes`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_logging()?;

    let lines = match cli.command {
        Commands::Resolve {
            manifest,
            base_path,
            locations,
        } => {
            let manifest = load_manifest(&manifest)?;
            resolve_locations(
                &manifest,
                RouterConfig::from_env(),
                base_path.as_deref(),
                &locations,
            )?
        }
        Commands::Routes { manifest, format } => {
            let manifest = load_manifest(&manifest)?;
            vec![render_routes(&manifest, format)?]
        }
        Commands::Normalize {
            base_path,
            locations,
        } => normalize_locations(&base_path, &locations),
    };

    for line in lines {
        println!("{line}");
    }
    Ok(())
}

/// Build a router from a final `config` whose controllers report into `lines`.
fn reporting_router(
    manifest: &RouteManifest,
    config: RouterConfig,
    lines: &Arc<Mutex<Vec<String>>>,
) -> anyhow::Result<Router> {
    let sink = Arc::clone(lines);
    let controller: Controller = Arc::new(move |activation: &Activation<'_>| {
        let params = serde_json::to_string(activation.params()).unwrap_or_default();
        info!(
            key = %activation.key(),
            path = %activation.path(),
            terminal = activation.is_terminal(),
            params = %params,
            "Route activated"
        );
        if let Ok(mut lines) = sink.lock() {
            lines.push(format!("activate {} {}", activation.key(), params));
        }
    });

    let mut router = Router::new(config);
    manifest.register_routes(&mut router, |_| Arc::clone(&controller))?;
    let sink = Arc::clone(lines);
    router.register_not_found(move |nf| {
        if let Ok(mut lines) = sink.lock() {
            lines.push(format!("not-found {} ({})", nf.remaining(), nf.path()));
        }
    });
    Ok(router)
}

/// Resolve `locations` in order and return one line per activation or miss.
///
/// The manifest's `config` is merged over `config`; `base_path`, when given,
/// replaces whatever base path that produced.
pub fn resolve_locations(
    manifest: &RouteManifest,
    config: RouterConfig,
    base_path: Option<&str>,
    locations: &[String],
) -> anyhow::Result<Vec<String>> {
    let mut config = manifest.router_config(config)?;
    if let Some(base_path) = base_path {
        config.base_path = base_path.to_string();
    }

    let lines = Arc::new(Mutex::new(Vec::new()));
    let mut router = reporting_router(manifest, config, &lines)?;

    for location in locations {
        if let Resolution::Matched { chain } = router.resolve(location) {
            info!(location = %location, chain = ?chain, "Location resolved");
        }
    }

    drop(router);
    let lines = Arc::try_unwrap(lines)
        .map_err(|_| anyhow::anyhow!("route controllers still hold the output buffer"))?
        .into_inner()
        .map_err(|_| anyhow::anyhow!("output buffer poisoned by a panicking controller"))?;
    Ok(lines)
}

/// Render the route tree a manifest builds.
pub fn render_routes(manifest: &RouteManifest, format: OutputFormat) -> anyhow::Result<String> {
    let router = manifest.build_router(RouterConfig::default(), |_| {
        Arc::new(|_: &Activation<'_>| {}) as Controller
    })?;
    let snapshot = router.routes();
    let rendered = match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&snapshot).context("failed to render routes as JSON")?
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(&snapshot).context("failed to render routes as YAML")?
        }
    };
    Ok(rendered)
}

/// Normalize each location with `base_path`.
#[must_use]
pub fn normalize_locations(base_path: &str, locations: &[String]) -> Vec<String> {
    locations
        .iter()
        .map(|location| format!("{location} -> {}", format_route(location, base_path)))
        .collect()
}

//! Unit tests for CLI commands

use crate::cli::{
    normalize_locations, render_routes, resolve_locations, Cli, Commands, OutputFormat,
};
use crate::manifest::RouteManifest;
use crate::runtime_config::RouterConfig;
use clap::Parser;
use serde_json::json;

fn manifest() -> RouteManifest {
    RouteManifest {
        config: json!({ "DEBUG": false }),
        routes: vec![
            "home".to_string(),
            "[home]/profile".to_string(),
            "users/:id".to_string(),
            "files/*rest".to_string(),
        ],
    }
}

fn quiet() -> RouterConfig {
    RouterConfig {
        debug: false,
        ..RouterConfig::default()
    }
}

fn locations(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_resolve_command_parses() {
    let cli = Cli::try_parse_from([
        "brrtnav",
        "resolve",
        "--manifest",
        "routes.yaml",
        "--base-path",
        "/app",
        "#!/home",
        "#!/users/1",
    ])
    .unwrap();

    match cli.command {
        Commands::Resolve {
            manifest,
            base_path,
            locations,
        } => {
            assert_eq!(manifest.to_string_lossy(), "routes.yaml");
            assert_eq!(base_path.as_deref(), Some("/app"));
            assert_eq!(locations, vec!["#!/home", "#!/users/1"]);
        }
        _ => panic!("Expected Resolve command"),
    }
}

#[test]
fn test_resolve_requires_a_location() {
    assert!(Cli::try_parse_from(["brrtnav", "resolve", "--manifest", "routes.yaml"]).is_err());
}

#[test]
fn test_routes_command_format() {
    let cli = Cli::try_parse_from([
        "brrtnav", "routes", "-m", "routes.toml", "--format", "yaml",
    ])
    .unwrap();
    match cli.command {
        Commands::Routes { format, .. } => assert_eq!(format, OutputFormat::Yaml),
        _ => panic!("Expected Routes command"),
    }

    let cli = Cli::try_parse_from(["brrtnav", "routes", "-m", "routes.toml"]).unwrap();
    match cli.command {
        Commands::Routes { format, .. } => assert_eq!(format, OutputFormat::Json),
        _ => panic!("Expected Routes command"),
    }

    assert!(Cli::try_parse_from([
        "brrtnav", "routes", "-m", "routes.toml", "--format", "xml",
    ])
    .is_err());
}

#[test]
fn test_normalize_command_defaults() {
    let cli = Cli::try_parse_from(["brrtnav", "normalize", "#!/about"]).unwrap();
    match cli.command {
        Commands::Normalize {
            base_path,
            locations,
        } => {
            assert_eq!(base_path, "");
            assert_eq!(locations, vec!["#!/about"]);
        }
        _ => panic!("Expected Normalize command"),
    }
}

#[test]
fn test_resolve_locations_reports_activations() {
    let lines = resolve_locations(
        &manifest(),
        quiet(),
        None,
        &locations(&["#!/home/profile", "#!/users/42"]),
    )
    .unwrap();

    assert_eq!(
        lines,
        vec![
            "activate home {}",
            "activate profile {}",
            r#"activate users/:id {"id":"42"}"#,
        ]
    );
}

#[test]
fn test_resolve_locations_skips_active_parent() {
    let lines = resolve_locations(
        &manifest(),
        quiet(),
        None,
        &locations(&["home/profile", "home/profile"]),
    )
    .unwrap();

    assert_eq!(
        lines,
        vec![
            "activate home {}",
            "activate profile {}",
            "activate profile {}",
        ]
    );
}

#[test]
fn test_resolve_locations_reports_not_found() {
    let lines = resolve_locations(&manifest(), quiet(), None, &locations(&["#!/nowhere"])).unwrap();
    assert_eq!(lines, vec!["not-found nowhere (nowhere)"]);
}

#[test]
fn test_resolve_locations_wildcard_params() {
    let lines = resolve_locations(&manifest(), quiet(), None, &locations(&["files/a/b"])).unwrap();
    assert_eq!(lines, vec![r#"activate files/*rest {"rest":["a","b"]}"#]);
}

#[test]
fn test_resolve_locations_with_base_path() {
    let config = RouterConfig {
        base_path: "/app".to_string(),
        ..quiet()
    };
    let lines = resolve_locations(&manifest(), config, None, &locations(&["/app/home"])).unwrap();
    assert_eq!(lines, vec!["activate home {}"]);
}

#[test]
fn test_base_path_flag_overrides_manifest() {
    let manifest = RouteManifest {
        config: json!({ "basePath": "/app", "DEBUG": false }),
        routes: vec!["home".to_string()],
    };
    let config = RouterConfig {
        base_path: "/env".to_string(),
        ..quiet()
    };

    let lines = resolve_locations(
        &manifest,
        config.clone(),
        Some("/other"),
        &locations(&["/other/home", "/app/home"]),
    )
    .unwrap();
    assert_eq!(
        lines,
        vec!["activate home {}", "not-found app/home (app/home)"]
    );

    let lines = resolve_locations(&manifest, config, None, &locations(&["/app/home"])).unwrap();
    assert_eq!(lines, vec!["activate home {}"]);
}

#[test]
fn test_resolve_locations_bad_manifest() {
    let manifest = RouteManifest {
        config: json!({}),
        routes: vec!["[ghost]/child".to_string()],
    };
    let err = resolve_locations(&manifest, quiet(), None, &locations(&["home"])).unwrap_err();
    assert!(format!("{err:#}").contains("ghost"));
}

#[test]
fn test_render_routes_json() {
    let rendered = render_routes(&manifest(), OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    let routes = value.as_array().unwrap();
    assert_eq!(routes.len(), 3);
    assert_eq!(routes[0]["key"], "home");
    assert_eq!(routes[0]["children"][0]["key"], "profile");
    assert_eq!(routes[1]["kind"]["type"], "single_param");
}

#[test]
fn test_render_routes_yaml() {
    let rendered = render_routes(&manifest(), OutputFormat::Yaml).unwrap();
    assert!(rendered.contains("key: home"));
    assert!(rendered.contains("key: files/*rest"));
}

#[test]
fn test_normalize_locations() {
    let lines = normalize_locations("/app", &locations(&["#!/about/", "#!/app/users/1", ""]));
    assert_eq!(
        lines,
        vec!["#!/about/ -> about", "#!/app/users/1 -> users/1", " -> /"]
    );
}

//! Location normalization
//!
//! Turns whatever the host hands us (a hash fragment, a pathname, a link
//! target) into the plain `a/b/c` form the resolver consumes.

use once_cell::sync::Lazy;
use regex::Regex;

/// Leading hash-bang style markers: `#`, `#!`, `/#!`, `?`, ...
#[allow(clippy::expect_used)]
static LOCATION_MARKERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/?[#!?]+").expect("location marker regex"));

/// Schemes that still count as navigable links.
#[allow(clippy::expect_used)]
static NAVIGABLE_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:https?|s?ftp):").expect("link scheme regex"));

/// Normalize a location into a resolvable route string.
///
/// - `""` becomes `/`
/// - a leading run of `#`, `!` or `?` (optionally after one `/`) is removed
/// - `base_path` is removed when the location starts with it
/// - one leading and one trailing `/` are removed; if nothing is left the
///   result is `/`
///
/// ```
/// use brrtnav::router::format_route;
///
/// assert_eq!(format_route("", ""), "/");
/// assert_eq!(format_route("#!/about", ""), "about");
/// assert_eq!(format_route("/app/users/42/", "/app"), "users/42");
/// ```
#[must_use]
pub fn format_route(location: &str, base_path: &str) -> String {
    if location.is_empty() {
        return "/".to_string();
    }

    let mut route = LOCATION_MARKERS.replace(location, "").into_owned();

    if !base_path.is_empty() {
        if let Some(stripped) = route.strip_prefix(base_path) {
            route = stripped.to_string();
        }
    }

    let trimmed = super::tree::trim_separators(&route);
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Normalize a link target the host wants to follow.
///
/// Returns `None` for targets the router should leave alone: `_blank`, and
/// anything carrying a scheme other than http(s)/(s)ftp (`mailto:`, `tel:`,
/// `javascript:`). Otherwise `origin` is stripped from the front and the rest
/// goes through [`format_route`].
#[must_use]
pub fn format_link(href: &str, origin: &str, base_path: &str) -> Option<String> {
    if href == "_blank" || (href.contains(':') && !NAVIGABLE_SCHEME.is_match(href)) {
        return None;
    }
    let local = if origin.is_empty() {
        href
    } else {
        href.strip_prefix(origin).unwrap_or(href)
    };
    Some(format_route(local, base_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_root() {
        assert_eq!(format_route("", ""), "/");
        assert_eq!(format_route("/", ""), "/");
        assert_eq!(format_route("#", ""), "/");
    }

    #[test]
    fn test_strips_hash_bang_markers() {
        assert_eq!(format_route("#!/about", ""), "about");
        assert_eq!(format_route("#/about", ""), "about");
        assert_eq!(format_route("/#!/about", ""), "about");
        assert_eq!(format_route("?/search", ""), "search");
    }

    #[test]
    fn test_strips_base_path_only_as_prefix() {
        assert_eq!(format_route("/app/home", "/app"), "home");
        assert_eq!(format_route("/home/app", "/app"), "home/app");
    }

    #[test]
    fn test_keeps_inner_separators() {
        assert_eq!(format_route("/users/42/posts/", ""), "users/42/posts");
    }

    #[test]
    fn test_link_filtering() {
        assert_eq!(format_link("_blank", "", ""), None);
        assert_eq!(format_link("mailto:me@example.com", "", ""), None);
        assert_eq!(
            format_link("https://example.com/docs/intro", "https://example.com", ""),
            Some("docs/intro".to_string())
        );
        assert_eq!(format_link("/about", "https://example.com", ""), Some("about".to_string()));
    }
}

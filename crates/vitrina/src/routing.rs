use std::path::{Path, PathBuf};

/// Normalizes a request path the way a client-side router reads it.
///
/// Hash-history URLs (`/#/about`) are read from their fragment, query strings are dropped, repeated slashes are
/// collapsed and the trailing slash is removed (except for the root path).
pub fn normalize_path(raw: &str) -> String {
    let path = match raw.find("#/") {
        Some(index) => &raw[index + 1..],
        None => raw.split('#').next().unwrap_or_default(),
    };
    let path = path.split('?').next().unwrap_or_default();

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Returns the key used to compare two paths. Matching is case-insensitive.
pub fn match_key(raw: &str) -> String {
    normalize_path(raw).to_lowercase()
}

pub fn guess_if_route_is_endpoint(raw_route: &str) -> bool {
    let real_path = Path::new(&raw_route);

    real_path.extension().is_some()
}

/// Output file for a route path, e.g. `/about` -> `dist/about/index.html` and `/404.html` -> `dist/404.html`.
pub fn file_path_for_route(route: &str, output_dir: &Path) -> PathBuf {
    let normalized = normalize_path(route);
    let relative = normalized.trim_start_matches('/');

    if guess_if_route_is_endpoint(&normalized) {
        output_dir.join(relative)
    } else if relative.is_empty() {
        output_dir.join("index.html")
    } else {
        output_dir.join(relative).join("index.html")
    }
}

//! Small helpers shared by the client, the settings loader and the connectors.

use std::collections::HashMap;

/// Snapshot of the process environment.
pub fn env_map() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// `{scheme}://{hostname}:{port}`.
///
/// An `https://` prefix on the hostname is kept; anything else gets `http://`.
/// A trailing slash on the hostname is dropped.
pub fn build_base_url(hostname: &str, port: u16) -> String {
    let host = hostname.trim();
    let (scheme, host) = match host.strip_prefix("https://") {
        Some(rest) => ("https", rest),
        None => ("http", host.strip_prefix("http://").unwrap_or(host)),
    };
    format!("{}://{}:{}", scheme, host.trim_end_matches('/'), port)
}

/// Append an endpoint path to a base URL, inserting the separating slash if missing.
pub fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.is_empty() {
        return base.to_string();
    }
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

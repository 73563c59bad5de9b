//! Helpers for sanitizing values before they enter tracing span fields.

use std::path::Path;

use reqwest::Url;

/// Returns only the file name of a path. Log files live under user
/// directories, so the directory part stays out of logs.
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Reduces an endpoint URL to `scheme://host[:port]`, dropping credentials,
/// path and query.
pub fn redact_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{}://{}:{}", parsed.scheme(), host, port),
            (Some(host), None) => format!("{}://{}", parsed.scheme(), host),
            (None, _) => "<invalid url>".to_string(),
        },
        Err(_) => "<invalid url>".to_string(),
    }
}

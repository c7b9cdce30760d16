use url::Url;

/// Derives a display name for a target from its URL
///
/// Uses the last non-empty path segment (`https://www.reddit.com/r/Python/`
/// becomes `Python`). Falls back to the host when the path is empty.
pub fn derive_target_name(url: &Url) -> String {
    let last_segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|s| s.to_string());

    match last_segment {
        Some(segment) => segment,
        None => url.host_str().unwrap_or("target").to_string(),
    }
}

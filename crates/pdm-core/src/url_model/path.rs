//! Filename extraction from URL path.

/// Returns everything after the final `/` of the URL's path (query and
/// fragment excluded), or `None` if the URL cannot be parsed or the path ends
/// in `/`.
pub fn leaf_name(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url.trim()).ok()?;
    let segment = parsed.path().rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }
    Some(segment.to_string())
}

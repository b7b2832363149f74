//! Linux-safe filename sanitization.

use super::{truncate_to_boundary, NAME_MAX};

/// Sanitizes a candidate filename for safe use on Linux.
///
/// - Replaces NUL, `/`, `\`, and control characters with `_`
/// - Trims leading/trailing whitespace
/// - Limits length to 255 bytes (Linux NAME_MAX)
///
/// Dots and repeated underscores are kept so the local name stays close to
/// the remote one.
pub fn sanitize_filename_for_linux(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c == '\0' || c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    truncate_to_boundary(replaced.trim(), NAME_MAX).to_string()
}

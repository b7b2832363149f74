//! URL modeling and file naming.
//!
//! Derives the local file name from the URL's last path segment and builds
//! the `name(n).ext` variants used to dodge collisions.

mod path;
mod percent;
mod sanitize;

pub use path::leaf_name;
pub use percent::percent_decode;
pub use sanitize::sanitize_filename_for_linux;

/// Default filename when the URL path yields nothing usable.
pub const DEFAULT_FILENAME: &str = "download.bin";

/// Derives a safe filename for saving `url`.
///
/// Uses the last path segment of the URL, sanitized for Linux. Falls back to
/// [`DEFAULT_FILENAME`] when the segment is empty or reserved.
///
/// # Examples
///
/// - `derive_filename("https://example.com/archive.zip")` → `"archive.zip"`
/// - `derive_filename("https://example.com/dir/")` → `"download.bin"`
pub fn derive_filename(url: &str) -> String {
    let Some(raw) = leaf_name(url) else {
        return DEFAULT_FILENAME.to_string();
    };
    let sanitized = sanitize_filename_for_linux(&raw);
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        DEFAULT_FILENAME.to_string()
    } else {
        sanitized
    }
}

/// Longest file name Linux accepts, in bytes.
pub const NAME_MAX: usize = 255;

/// Collision variant `n` of `name`: `(n)` goes before the first `.`, or at
/// the end when there is none (`report.tar.gz` → `report(2).tar.gz`,
/// `data` → `data(2)`). The stem (then the extension) is shortened on a char
/// boundary so the result stays within [`NAME_MAX`].
pub fn disambiguate(name: &str, n: u32) -> String {
    let suffix = format!("({})", n);
    let (stem, ext) = name.split_at(name.find('.').unwrap_or(name.len()));
    let room = NAME_MAX.saturating_sub(suffix.len());

    let (stem, ext) = if stem.len() + ext.len() <= room {
        (stem, ext)
    } else if ext.len() <= room {
        (truncate_to_boundary(stem, room - ext.len()), ext)
    } else {
        ("", truncate_to_boundary(ext, room))
    };
    format!("{}{}{}", stem, suffix, ext)
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a char.
pub(crate) fn truncate_to_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

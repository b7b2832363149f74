//! Startup checks that must pass before any scheduling: configuration and
//! the URL list. Failures here end the process with [`StartupError::EXIT_CODE`].

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{self, ConfigError, PropertyStore};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("no url file configured (set download.url.filepath or pass --urls)")]
    NoUrlFile,
    #[error("url file {path} is unavailable: {reason}")]
    UrlFileUnavailable { path: PathBuf, reason: String },
    #[error("cannot read url file {path}: {source}")]
    UrlFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StartupError {
    /// Process exit status for any startup failure.
    pub const EXIT_CODE: i32 = 30;
}

/// Load configuration from `path`, or from the default location (created on
/// first use) when `None`.
pub fn load_config(path: Option<&Path>) -> Result<PropertyStore, StartupError> {
    let store = match path {
        Some(p) => PropertyStore::load_from_path(p)?,
        None => config::load_or_init()?,
    };
    tracing::debug!(keys = store.len(), "configuration loaded");
    Ok(store)
}

/// Check that `path` names a readable regular file.
pub fn validate_url_file(path: &Path) -> Result<(), StartupError> {
    let unavailable = |reason: String| StartupError::UrlFileUnavailable {
        path: path.to_path_buf(),
        reason,
    };
    let meta = fs::metadata(path).map_err(|e| unavailable(e.to_string()))?;
    if !meta.is_file() {
        return Err(unavailable("not a regular file".to_string()));
    }
    File::open(path).map_err(|e| unavailable(e.to_string()))?;
    Ok(())
}

/// Read the URL list: one URL per line, trimmed. Blank lines and lines
/// starting with `#` are skipped; repeated URLs collapse into one.
pub fn load_urls(path: &Path) -> Result<BTreeSet<String>, StartupError> {
    let text = fs::read_to_string(path).map_err(|source| StartupError::UrlFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let urls: BTreeSet<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect();
    tracing::info!(path = %path.display(), urls = urls.len(), "url list loaded");
    Ok(urls)
}

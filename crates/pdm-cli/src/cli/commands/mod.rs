//! CLI command handlers, one per file.

mod config_path;
mod plan;
mod run;

pub use config_path::run_config_path;
pub use plan::run_plan;
pub use run::run_downloads;

use pdm_core::config::Settings;
use pdm_core::startup::{self, StartupError};
use std::collections::BTreeSet;

use super::Inputs;

/// Configuration and URL list, loaded and checked before any planning.
pub(super) struct Prepared {
    pub settings: Settings,
    pub urls: BTreeSet<String>,
}

/// Startup sequence shared by `run` and `plan`. Every failure here is a
/// [`StartupError`] so the process exits with its dedicated status.
pub(super) fn prepare(inputs: &Inputs) -> Result<Prepared, StartupError> {
    let store = startup::load_config(inputs.config.as_deref())?;
    let settings = Settings::from_provider(&store);

    let url_file = inputs
        .urls
        .clone()
        .or_else(|| settings.url_file.clone())
        .ok_or(StartupError::NoUrlFile)?;
    startup::validate_url_file(&url_file)?;
    let urls = startup::load_urls(&url_file)?;

    Ok(Prepared { settings, urls })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn prepare_uses_url_file_from_config() {
        let dir = tempdir().unwrap();
        let urls = dir.path().join("urls.txt");
        fs::write(&urls, "http://h/a\nhttp://h/a\n").unwrap();
        let config = dir.path().join("pdm.toml");
        fs::write(
            &config,
            format!("download.url.filepath = {:?}\n", urls.display().to_string()),
        )
        .unwrap();

        let prepared = prepare(&Inputs {
            config: Some(config),
            urls: None,
        })
        .unwrap();
        assert_eq!(prepared.urls.len(), 1);
    }

    #[test]
    fn prepare_without_url_file_is_startup_error() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("pdm.toml");
        fs::write(&config, "").unwrap();
        let err = prepare(&Inputs {
            config: Some(config),
            urls: None,
        })
        .err()
        .unwrap();
        assert!(matches!(err, StartupError::NoUrlFile));
    }

    #[test]
    fn prepare_missing_url_file_is_startup_error() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("pdm.toml");
        fs::write(&config, "").unwrap();
        let err = prepare(&Inputs {
            config: Some(config),
            urls: Some(dir.path().join("nope.txt")),
        })
        .err()
        .unwrap();
        assert!(matches!(err, StartupError::UrlFileUnavailable { .. }));
    }
}

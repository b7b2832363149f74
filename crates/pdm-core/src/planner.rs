//! Destination planning: pick the directory for a protocol (creating it when
//! allowed) and a file name that collides with nothing on disk or earlier in
//! the same batch.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::Settings;
use crate::protocol::Protocol;
use crate::url_model::{derive_filename, disambiguate};

/// Why no destination could be planned. The caller drops the URL.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("no download directory configured for {0}")]
    NotConfigured(Protocol),
    #[error("download directory {0} does not exist and creating it is disabled")]
    Missing(PathBuf),
    #[error("cannot create download directory {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("download path {0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("cannot check whether {path} exists: {source}")]
    Inspect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Plans destinations for one batch.
///
/// Holds the batch's reservations, so a single planner must see every URL of
/// the batch and must be used from one thread only (planning happens before
/// any transfer starts).
#[derive(Debug)]
pub struct PathPlanner<'a> {
    settings: &'a Settings,
    reserved: HashSet<PathBuf>,
}

impl<'a> PathPlanner<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            reserved: HashSet::new(),
        }
    }

    /// Plan the destination for `url`, reserving it for the rest of the batch.
    pub fn plan(&mut self, protocol: Protocol, url: &str) -> Result<PathBuf, PlanError> {
        let dir = self.destination_dir(protocol)?;
        let name = derive_filename(url);

        let mut candidate = dir.join(&name);
        let mut n = 1u32;
        while self.is_taken(&candidate)? {
            candidate = dir.join(disambiguate(&name, n));
            n += 1;
        }

        self.reserved.insert(candidate.clone());
        Ok(candidate)
    }

    /// Resolve (and, if permitted, create) the download directory for `protocol`.
    /// The returned path is absolute.
    pub fn destination_dir(&self, protocol: Protocol) -> Result<PathBuf, PlanError> {
        let dir = self
            .settings
            .download_dir(protocol)
            .ok_or(PlanError::NotConfigured(protocol))?;

        if !dir.exists() {
            if !self.settings.create_missing_dirs {
                return Err(PlanError::Missing(dir.clone()));
            }
            fs::create_dir_all(dir).map_err(|source| PlanError::Create {
                path: dir.clone(),
                source,
            })?;
            tracing::info!(protocol = %protocol, dir = %dir.display(), "created download directory");
        }
        if !dir.is_dir() {
            return Err(PlanError::NotADirectory(dir.clone()));
        }

        fs::canonicalize(dir).map_err(|source| PlanError::Create {
            path: dir.clone(),
            source,
        })
    }

    /// Destinations reserved so far in this batch.
    pub fn reserved(&self) -> impl Iterator<Item = &Path> {
        self.reserved.iter().map(PathBuf::as_path)
    }

    /// Earlier reservations always count; an existing file only counts when
    /// overriding is off (with it on, the transfer replaces the file).
    /// Only `NotFound` means free: any other lookup error fails the URL.
    fn is_taken(&self, candidate: &Path) -> Result<bool, PlanError> {
        if self.reserved.contains(candidate) {
            return Ok(true);
        }
        if self.settings.override_existing {
            return Ok(false);
        }
        match fs::symlink_metadata(candidate) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(PlanError::Inspect {
                path: candidate.to_path_buf(),
                source,
            }),
        }
    }
}

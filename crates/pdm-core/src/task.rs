//! The planned download unit handed from preprocessing to the scheduler.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::protocol::Protocol;

/// One URL's download: where it comes from, how, and where it lands.
///
/// Built once by the preprocessor and read-only afterwards; the destination
/// was collision-free when the task was planned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadTask {
    url: String,
    protocol: Protocol,
    destination: PathBuf,
}

impl DownloadTask {
    pub fn new(url: impl Into<String>, protocol: Protocol, destination: PathBuf) -> Self {
        Self {
            url: url.into().trim().to_string(),
            protocol,
            destination,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

//! Turn a URL set into the batch of planned tasks.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::Settings;
use crate::planner::PathPlanner;
use crate::protocol::Protocol;
use crate::task::DownloadTask;

/// Resolve and plan every URL in `urls`, keyed by URL.
///
/// URLs are visited in lexicographic order, so when several of them share a
/// leaf name the smallest one keeps the plain name and the rest are numbered
/// in order. Rejected or unplannable URLs are logged and left out; nothing
/// here fails the batch. May create destination directories.
pub fn preprocess(urls: &BTreeSet<String>, settings: &Settings) -> BTreeMap<String, DownloadTask> {
    let mut planner = PathPlanner::new(settings);
    let mut tasks = BTreeMap::new();

    for raw in urls {
        let url = raw.trim();
        if url.is_empty() || tasks.contains_key(url) {
            continue;
        }

        let protocol = match Protocol::resolve(url) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(url, error = %e, "skipping url");
                continue;
            }
        };

        let destination = match planner.plan(protocol, url) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(url, protocol = %protocol, error = %e, "skipping url");
                continue;
            }
        };

        tracing::debug!(url, destination = %destination.display(), "planned");
        tasks.insert(url.to_string(), DownloadTask::new(url, protocol, destination));
    }

    tracing::info!(planned = tasks.len(), dropped = urls.len() - tasks.len(), "preprocessing done");
    tasks
}

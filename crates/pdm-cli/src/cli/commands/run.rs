//! `pdm run` – plan the URL list and download it.

use anyhow::{Context, Result};
use pdm_core::preprocess::preprocess;
use pdm_core::scheduler::{RetryingScheduler, RunSummary, SchedulerEvent, TaskState};
use pdm_core::transport::TransportRegistry;
use std::path::Path;
use std::sync::Arc;

use super::{prepare, Prepared};
use crate::cli::Inputs;

pub async fn run_downloads(inputs: &Inputs, jobs: Option<usize>, report: Option<&Path>) -> Result<()> {
    let Prepared { mut settings, urls } = prepare(inputs)?;
    if let Some(n) = jobs {
        settings.pool_size = n.max(1);
    }

    let tasks = preprocess(&urls, &settings);
    let skipped = urls.len() - tasks.len();
    if skipped > 0 {
        println!("{} url(s) skipped during planning (see log)", skipped);
    }

    let registry = Arc::new(TransportRegistry::with_defaults(&settings));
    let scheduler = RetryingScheduler::new(registry, settings.retry, settings.pool_size);
    tracing::info!(
        tasks = tasks.len(),
        concurrency = scheduler.concurrency(),
        "starting run"
    );

    let mut handle = scheduler.spawn(tasks.into_values().collect());
    while let Some(event) = handle.events.recv().await {
        if let SchedulerEvent::State {
            url,
            state: TaskState::Retrying { attempt, delay },
        } = event
        {
            println!(
                "  retry  {} (attempt {} failed, next in {} ms)",
                url,
                attempt,
                delay.as_millis()
            );
        }
    }
    let summary = handle.wait().await.context("scheduler task join")?;

    print_table(&summary);
    if let Some(path) = report {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)
            .with_context(|| format!("write report {}", path.display()))?;
    }
    println!(
        "{} succeeded, {} failed, {} skipped",
        summary.succeeded(),
        summary.failed(),
        skipped
    );
    Ok(())
}

fn print_table(summary: &RunSummary) {
    for r in &summary.reports {
        let state = if r.is_success() { "ok" } else { "FAILED" };
        match &r.error {
            None => println!(
                "{:<6} {:>2}x {:>12} B  {} -> {}",
                state,
                r.attempts,
                r.bytes,
                r.url,
                r.destination.display()
            ),
            Some(err) => println!("{:<6} {:>2}x  {}  ({})", state, r.attempts, r.url, err),
        }
    }
}

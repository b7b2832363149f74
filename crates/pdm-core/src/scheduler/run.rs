//! Drive each task through its attempts.

use std::io;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle, JoinSet};

use super::outcome::{AttemptOutcome, RunSummary, SchedulerEvent, TaskReport, TaskState};
use crate::retry::{classify, RetryDecision, RetryPolicy, TransportError};
use crate::task::DownloadTask;
use crate::transport::TransportRegistry;

/// Runs download batches. Cheap to clone; clones share the slot pool.
#[derive(Debug, Clone)]
pub struct RetryingScheduler {
    registry: Arc<TransportRegistry>,
    policy: RetryPolicy,
    slots: Arc<Semaphore>,
    concurrency: usize,
}

/// A run started with [`RetryingScheduler::spawn`].
#[derive(Debug)]
pub struct RunHandle {
    pub events: UnboundedReceiver<SchedulerEvent>,
    summary: JoinHandle<RunSummary>,
}

impl RunHandle {
    /// Wait for every task to reach a terminal state.
    pub async fn wait(self) -> Result<RunSummary, JoinError> {
        self.summary.await
    }
}

impl RetryingScheduler {
    /// `concurrency` is clamped to at least 1.
    pub fn new(registry: Arc<TransportRegistry>, policy: RetryPolicy, concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            registry,
            policy,
            slots: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run every task to a terminal state. Events, if requested, are sent as
    /// they happen; the summary is returned at the end.
    pub async fn run(
        &self,
        tasks: impl IntoIterator<Item = DownloadTask>,
        events: Option<UnboundedSender<SchedulerEvent>>,
    ) -> RunSummary {
        let notifier = Notifier(events);
        let tasks: Vec<DownloadTask> = tasks.into_iter().collect();
        let mut join_set = JoinSet::new();

        for (index, task) in tasks.iter().enumerate() {
            notifier.state(task.url(), TaskState::Pending);
            let worker = Worker {
                registry: Arc::clone(&self.registry),
                policy: self.policy,
                slots: Arc::clone(&self.slots),
                notifier: notifier.clone(),
            };
            let task = task.clone();
            join_set.spawn(async move { (index, worker.drive(task).await) });
        }

        let mut finished: Vec<Option<TaskReport>> = vec![None; tasks.len()];
        while let Some(res) = join_set.join_next().await {
            match res {
                Ok((index, report)) => finished[index] = Some(report),
                Err(e) => tracing::error!("scheduler task join: {}", e),
            }
        }

        let summary = RunSummary::new(settle(tasks, finished, &notifier));
        tracing::info!(
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            bytes = summary.total_bytes(),
            "run finished"
        );
        summary
    }

    /// Start a run in the background and stream its events. Must be called
    /// from within a tokio runtime.
    pub fn spawn(&self, tasks: Vec<DownloadTask>) -> RunHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = self.clone();
        let summary = tokio::spawn(async move { scheduler.run(tasks, Some(tx)).await });
        RunHandle {
            events: rx,
            summary,
        }
    }
}

/// One report per submitted task, in submission order. A task whose worker
/// never returned a report (it panicked or was cancelled) is failed here.
fn settle(
    tasks: Vec<DownloadTask>,
    mut finished: Vec<Option<TaskReport>>,
    notifier: &Notifier,
) -> Vec<TaskReport> {
    tasks
        .into_iter()
        .enumerate()
        .map(|(index, task)| {
            finished
                .get_mut(index)
                .and_then(Option::take)
                .unwrap_or_else(|| {
                    let err = TransportError::Aborted("worker exited without a report".to_string());
                    tracing::error!(url = %task.url(), error = %err, "download failed");
                    discard_destination(task.destination());
                    notifier.state(task.url(), TaskState::Failed);
                    TaskReport::failed(&task, 0, err.to_string())
                })
        })
        .collect()
}

/// Remove what sits at a failed task's destination, including an older file
/// that override mode would have replaced.
fn discard_destination(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "removed destination of failed task"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            path = %path.display(),
            error = %e,
            "cannot remove destination of failed task"
        ),
    }
}

/// Event sink shared by all workers; a dropped receiver just stops delivery.
#[derive(Debug, Clone)]
struct Notifier(Option<UnboundedSender<SchedulerEvent>>);

impl Notifier {
    fn state(&self, url: &str, state: TaskState) {
        self.send(SchedulerEvent::State {
            url: url.to_string(),
            state,
        });
    }

    fn attempt(&self, url: &str, attempt: u32, result: &Result<u64, TransportError>) {
        self.send(SchedulerEvent::Attempt(AttemptOutcome {
            url: url.to_string(),
            attempt,
            success: result.is_ok(),
            error: result.as_ref().err().map(ToString::to_string),
        }));
    }

    fn send(&self, event: SchedulerEvent) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(event);
        }
    }
}

/// Everything one task needs; owned so it can move into its tokio task.
struct Worker {
    registry: Arc<TransportRegistry>,
    policy: RetryPolicy,
    slots: Arc<Semaphore>,
    notifier: Notifier,
}

impl Worker {
    async fn drive(self, task: DownloadTask) -> TaskReport {
        let url = task.url().to_string();

        let Some(transport) = self.registry.for_protocol(task.protocol()) else {
            let err = TransportError::NoTransport(task.protocol());
            return self.fail(&task, 0, &err);
        };

        let task = Arc::new(task);
        let mut attempt = 0u32;
        loop {
            attempt += 1;

            let result = {
                // Slot is held for the fetch only, never across the backoff sleep.
                let _slot = match self.slots.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        let err = TransportError::Aborted("scheduler closed".to_string());
                        return self.fail(&task, attempt - 1, &err);
                    }
                };
                self.notifier.state(&url, TaskState::Running { attempt });
                tracing::debug!(url = %url, attempt, "attempt started");

                let transport = Arc::clone(&transport);
                let job = Arc::clone(&task);
                match tokio::task::spawn_blocking(move || transport.fetch(&job)).await {
                    Ok(r) => r,
                    Err(e) => Err(TransportError::Aborted(e.to_string())),
                }
            };
            self.notifier.attempt(&url, attempt, &result);

            let err = match result {
                Ok(bytes) => {
                    tracing::info!(url = %url, attempt, bytes, "download succeeded");
                    self.notifier.state(&url, TaskState::Succeeded);
                    return TaskReport::succeeded(&task, attempt, bytes);
                }
                Err(err) => err,
            };

            match self.policy.decide(attempt, classify(&err)) {
                RetryDecision::RetryAfter(delay) => {
                    tracing::warn!(
                        url = %url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "attempt failed, retrying"
                    );
                    self.notifier
                        .state(&url, TaskState::Retrying { attempt, delay });
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::NoRetry => return self.fail(&task, attempt, &err),
            }
        }
    }

    /// Terminal failure: nothing is left at the destination.
    fn fail(&self, task: &DownloadTask, attempts: u32, err: &TransportError) -> TaskReport {
        tracing::error!(url = %task.url(), attempts, error = %err, "download failed");
        discard_destination(task.destination());
        self.notifier.state(task.url(), TaskState::Failed);
        TaskReport::failed(task, attempts, err.to_string())
    }
}

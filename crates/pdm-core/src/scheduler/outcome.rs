//! What the scheduler reports: state transitions, per-attempt outcomes and
//! the per-task terminal report.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::task::DownloadTask;

/// Lifecycle of a task inside one run.
///
/// `Pending → Running → {Succeeded | Retrying | Failed}`, with `Retrying`
/// leading back to `Running` once its delay has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Running { attempt: u32 },
    Retrying { attempt: u32, delay: Duration },
    Succeeded,
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed)
    }
}

/// Result of a single fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptOutcome {
    pub url: String,
    /// 1-based.
    pub attempt: u32,
    pub success: bool,
    pub error: Option<String>,
}

/// Streamed while a run progresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    State { url: String, state: TaskState },
    Attempt(AttemptOutcome),
}

/// Terminal outcome of one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskReport {
    pub url: String,
    pub destination: PathBuf,
    pub state: TaskState,
    pub attempts: u32,
    pub bytes: u64,
    pub error: Option<String>,
}

impl TaskReport {
    pub(super) fn succeeded(task: &DownloadTask, attempts: u32, bytes: u64) -> Self {
        Self {
            url: task.url().to_string(),
            destination: task.destination().to_path_buf(),
            state: TaskState::Succeeded,
            attempts,
            bytes,
            error: None,
        }
    }

    pub(super) fn failed(task: &DownloadTask, attempts: u32, error: String) -> Self {
        Self {
            url: task.url().to_string(),
            destination: task.destination().to_path_buf(),
            state: TaskState::Failed,
            attempts,
            bytes: 0,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.state == TaskState::Succeeded
    }
}

/// Every task's report, sorted by URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub reports: Vec<TaskReport>,
}

impl RunSummary {
    pub(super) fn new(mut reports: Vec<TaskReport>) -> Self {
        reports.sort_by(|a, b| a.url.cmp(&b.url));
        Self { reports }
    }

    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.len() - self.succeeded()
    }

    pub fn total_bytes(&self) -> u64 {
        self.reports.iter().map(|r| r.bytes).sum()
    }

    pub fn get(&self, url: &str) -> Option<&TaskReport> {
        self.reports.iter().find(|r| r.url == url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Protocol;

    #[test]
    fn summary_counts_and_sorts() {
        let a = DownloadTask::new("http://h/b", Protocol::Http, "/d/b".into());
        let b = DownloadTask::new("http://h/a", Protocol::Http, "/d/a".into());
        let summary = RunSummary::new(vec![
            TaskReport::succeeded(&a, 1, 10),
            TaskReport::failed(&b, 4, "timeout".into()),
        ]);
        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.total_bytes(), 10);
        assert_eq!(summary.reports[0].url, "http://h/a");
        assert_eq!(summary.get("http://h/b").unwrap().attempts, 1);
    }

    #[test]
    fn report_serializes_state_tag() {
        let t = DownloadTask::new("ftp://h/x", Protocol::Ftp, "/d/x".into());
        let json = serde_json::to_value(TaskReport::failed(&t, 3, "boom".into())).unwrap();
        assert_eq!(json["state"]["state"], "failed");
        assert_eq!(json["attempts"], 3);
        assert_eq!(json["error"], "boom");
    }

    #[test]
    fn terminal_states() {
        assert!(TaskState::Succeeded.is_terminal());
        assert!(TaskState::Failed.is_terminal());
        assert!(!TaskState::Running { attempt: 1 }.is_terminal());
        assert!(!TaskState::Pending.is_terminal());
    }
}

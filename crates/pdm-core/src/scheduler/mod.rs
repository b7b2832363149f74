//! Retrying scheduler: runs a planned batch on a bounded pool of transfer
//! slots, retrying transient failures with exponential backoff.
//!
//! - At most `concurrency` fetches run at once; excess attempts queue on a
//!   fair semaphore.
//! - Backoff waits are async sleeps taken without a slot, so other tasks use
//!   the capacity meanwhile.
//! - Attempts of one task are strictly sequential; different tasks are
//!   independent and finish in any order.

mod outcome;
mod run;

pub use outcome::{AttemptOutcome, RunSummary, SchedulerEvent, TaskReport, TaskState};
pub use run::{RetryingScheduler, RunHandle};

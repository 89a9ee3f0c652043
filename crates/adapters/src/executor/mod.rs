// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job execution adapters

mod docker;
mod process;

pub use docker::DockerExecutor;
pub use process::ProcessExecutor;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeExecutor;

use async_trait::async_trait;
use dd_core::{Job, JobOutcome};
use thiserror::Error;

/// Errors from the execution adapter itself.
///
/// A task exiting non-zero is NOT an executor error — that is a failed
/// [`JobOutcome`]. These are the cases where the job could not be run
/// at all or had to be abandoned.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("failed to start job {job}: {reason}")]
    StartFailed { job: String, reason: String },
    #[error("job {job} task {task} timed out or broke: {reason}")]
    TaskBroken {
        job: String,
        task: usize,
        reason: String,
    },
}

/// Adapter for running one job to completion.
///
/// Executes each task of the job in declared order within one ephemeral
/// execution context: filesystem state persists across tasks within the
/// same job, not across jobs unless storage is explicitly enabled.
/// Fails fast — the first non-zero task exit skips the rest and marks
/// the job failed with that task's output captured.
#[async_trait]
pub trait JobExecutor: Clone + Send + Sync + 'static {
    async fn submit(&self, job: &Job) -> Result<JobOutcome, ExecutorError>;
}

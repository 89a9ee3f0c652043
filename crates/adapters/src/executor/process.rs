// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host-process job executor
//!
//! Runs tasks directly on the host via `sh -c`, one ephemeral working
//! directory per job. Used for local development and integration tests
//! where a container runtime is unavailable; the job's container image
//! is recorded but not used. `HOME` is pointed at the working directory
//! so tasks that write config files ($HOME/.config/hub) stay contained.

use super::{ExecutorError, JobExecutor};
use crate::subprocess::{run_with_timeout, TASK_TIMEOUT};
use async_trait::async_trait;
use dd_core::{Job, JobOutcome};
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

/// Runs jobs as plain host processes.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    /// Directory shared between storage-enabled jobs
    share_dir: PathBuf,
    task_timeout: Duration,
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self {
            share_dir: std::env::temp_dir().join(format!("drydock-share-{}", uuid::Uuid::new_v4())),
            task_timeout: TASK_TIMEOUT,
        }
    }

    /// Use an explicit shared-storage directory.
    pub fn with_share_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.share_dir = dir.into();
        self
    }

    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = timeout;
        self
    }

    fn workdir_for(&self, job: &Job) -> PathBuf {
        if job.storage {
            self.share_dir.clone()
        } else {
            std::env::temp_dir().join(format!("drydock-job-{}", uuid::Uuid::new_v4()))
        }
    }
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobExecutor for ProcessExecutor {
    async fn submit(&self, job: &Job) -> Result<JobOutcome, ExecutorError> {
        let span = tracing::info_span!("job", name = %job.name, image = %job.image);
        let _guard = span.enter();
        tracing::debug!("image ignored by process executor");

        let workdir = self.workdir_for(job);
        std::fs::create_dir_all(&workdir).map_err(|e| ExecutorError::StartFailed {
            job: job.name.clone(),
            reason: e.to_string(),
        })?;

        let mut output = String::new();
        let mut exit_code = 0;

        for (index, task) in job.tasks.iter().enumerate() {
            let mut cmd = Command::new("sh");
            cmd.arg("-c")
                .arg(task)
                .current_dir(&workdir)
                .env("HOME", &workdir);
            for (key, val) in &job.env {
                cmd.env(key, val);
            }

            let result = run_with_timeout(cmd, self.task_timeout, "task").await;
            let task_output = match result {
                Ok(task_output) => task_output,
                Err(reason) => {
                    cleanup(job, &workdir);
                    return Err(ExecutorError::TaskBroken {
                        job: job.name.clone(),
                        task: index,
                        reason,
                    });
                }
            };

            output.push_str(&String::from_utf8_lossy(&task_output.stdout));
            output.push_str(&String::from_utf8_lossy(&task_output.stderr));

            let code = task_output.status.code().unwrap_or(-1);
            tracing::debug!(task = index, exit = code, "task finished");
            if code != 0 {
                // Fail fast: remaining tasks are skipped
                exit_code = code;
                break;
            }
        }

        cleanup(job, &workdir);

        tracing::info!(exit = exit_code, "job finished");
        Ok(JobOutcome {
            job: job.name.clone(),
            exit_code,
            output,
        })
    }
}

/// Remove a job's ephemeral directory. Shared storage survives so later
/// jobs in the same build can read it.
fn cleanup(job: &Job, workdir: &PathBuf) {
    if job.storage {
        return;
    }
    if let Err(e) = std::fs::remove_dir_all(workdir) {
        tracing::warn!(job = %job.name, error = %e, "failed to remove job workdir");
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;

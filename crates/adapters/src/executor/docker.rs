// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docker-backed job executor
//!
//! One ephemeral container per job: started idle, each task `exec`ed
//! into it in declared order, removed unconditionally afterwards. This
//! keeps filesystem state alive across the tasks of one job while jobs
//! stay isolated from each other. Jobs with storage enabled share a
//! named volume mounted at [`SHARE_MOUNT`].

use super::{ExecutorError, JobExecutor};
use crate::subprocess::{run_with_timeout, CONTAINER_SETUP_TIMEOUT, TASK_TIMEOUT};
use async_trait::async_trait;
use dd_core::{Job, JobOutcome};
use std::time::Duration;
use tokio::process::Command;

/// Mount point of the shared build volume inside job containers.
pub const SHARE_MOUNT: &str = "/mnt/build/share";

/// Runs jobs in ephemeral Docker containers.
#[derive(Debug, Clone)]
pub struct DockerExecutor {
    binary: String,
    storage_volume: String,
    task_timeout: Duration,
}

impl DockerExecutor {
    pub fn new() -> Self {
        Self {
            binary: "docker".to_string(),
            storage_volume: "drydock-share".to_string(),
            task_timeout: TASK_TIMEOUT,
        }
    }

    /// Use a different container runtime binary (e.g. podman).
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Name of the volume shared between storage-enabled jobs.
    pub fn with_storage_volume(mut self, volume: impl Into<String>) -> Self {
        self.storage_volume = volume.into();
        self
    }

    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = timeout;
        self
    }

    /// Arguments that start the job's idle container.
    fn start_args(&self, job: &Job) -> Vec<String> {
        let mut args = vec!["run".to_string(), "-d".to_string()];
        if job.storage {
            args.push("-v".to_string());
            args.push(format!("{}:{}", self.storage_volume, SHARE_MOUNT));
        }
        args.push("--entrypoint".to_string());
        args.push("sh".to_string());
        args.push(job.image.clone());
        args.push("-c".to_string());
        args.push("sleep 2147483647".to_string());
        args
    }

    /// Arguments that run one task inside the job's container.
    ///
    /// Env vars are injected per exec, so secrets reach the container
    /// only while a task runs and never land in the image or the
    /// create-time config.
    fn exec_args(&self, container_id: &str, job: &Job, task: &str) -> Vec<String> {
        let mut args = vec!["exec".to_string()];
        for (key, val) in &job.env {
            args.push("-e".to_string());
            args.push(format!("{key}={val}"));
        }
        if job.storage {
            args.push("-w".to_string());
            args.push(SHARE_MOUNT.to_string());
        }
        args.push(container_id.to_string());
        args.push("sh".to_string());
        args.push("-c".to_string());
        args.push(task.to_string());
        args
    }

    fn remove_args(&self, container_id: &str) -> Vec<String> {
        vec![
            "rm".to_string(),
            "-f".to_string(),
            container_id.to_string(),
        ]
    }

    async fn remove_container(&self, job: &str, container_id: &str) {
        let mut cmd = Command::new(&self.binary);
        cmd.args(self.remove_args(container_id));
        if let Err(reason) =
            run_with_timeout(cmd, CONTAINER_SETUP_TIMEOUT, "container remove").await
        {
            tracing::warn!(job, container_id, reason, "failed to remove job container");
        }
    }
}

impl Default for DockerExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobExecutor for DockerExecutor {
    async fn submit(&self, job: &Job) -> Result<JobOutcome, ExecutorError> {
        let span = tracing::info_span!("job", name = %job.name, image = %job.image);
        let _guard = span.enter();

        let mut start = Command::new(&self.binary);
        start.args(self.start_args(job));
        let started = run_with_timeout(start, CONTAINER_SETUP_TIMEOUT, "container start")
            .await
            .map_err(|reason| ExecutorError::StartFailed {
                job: job.name.clone(),
                reason,
            })?;

        if !started.status.success() {
            return Err(ExecutorError::StartFailed {
                job: job.name.clone(),
                reason: String::from_utf8_lossy(&started.stderr).trim().to_string(),
            });
        }
        let container_id = String::from_utf8_lossy(&started.stdout).trim().to_string();

        let mut output = String::new();
        let mut exit_code = 0;

        for (index, task) in job.tasks.iter().enumerate() {
            let mut exec = Command::new(&self.binary);
            exec.args(self.exec_args(&container_id, job, task));

            let result = run_with_timeout(exec, self.task_timeout, "task").await;
            let task_output = match result {
                Ok(task_output) => task_output,
                Err(reason) => {
                    self.remove_container(&job.name, &container_id).await;
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

        self.remove_container(&job.name, &container_id).await;

        tracing::info!(exit = exit_code, "job finished");
        Ok(JobOutcome {
            job: job.name.clone(),
            exit_code,
            output,
        })
    }
}

#[cfg(test)]
#[path = "docker_tests.rs"]
mod tests;

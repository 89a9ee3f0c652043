// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline groups: run policies over a set of jobs

use dd_adapters::JobExecutor;
use dd_core::{Job, JobOutcome};
use tokio::task::JoinSet;

/// A set of jobs with a declared concurrency policy.
///
/// Exists only for the duration of one event handling. An executor
/// error for one job is folded into a synthesized failed outcome so a
/// broken job never prevents its siblings from running.
#[derive(Debug, Default)]
pub struct PipelineGroup {
    jobs: Vec<Job>,
}

impl PipelineGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, job: Job) {
        self.jobs.push(job);
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Fire jobs in order, waiting for each before starting the next.
    ///
    /// A failed job does not prevent later jobs from running — the
    /// observed best-effort-notify semantics, deliberately preserved.
    /// Outcomes come back in declaration order.
    pub async fn run_each<E: JobExecutor>(&self, executor: &E) -> Vec<JobOutcome> {
        let mut outcomes = Vec::with_capacity(self.jobs.len());
        for job in &self.jobs {
            outcomes.push(submit_best_effort(executor, job).await);
        }
        outcomes
    }

    /// Fire all jobs concurrently. No ordering guarantee; jobs must be
    /// independent and must not write to the same working directory.
    /// Outcomes come back in completion order.
    pub async fn run_all<E: JobExecutor>(&self, executor: &E) -> Vec<JobOutcome> {
        let mut set = JoinSet::new();
        for job in self.jobs.iter().cloned() {
            let executor = executor.clone();
            set.spawn(async move { submit_best_effort(&executor, &job).await });
        }

        let mut outcomes = Vec::with_capacity(self.jobs.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => tracing::error!(error = %e, "job task panicked"),
            }
        }
        outcomes
    }
}

async fn submit_best_effort<E: JobExecutor>(executor: &E, job: &Job) -> JobOutcome {
    match executor.submit(job).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(job = %job.name, error = %e, "executor failed to run job");
            JobOutcome {
                job: job.name.clone(),
                exit_code: -1,
                output: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
#[path = "group_tests.rs"]
mod tests;

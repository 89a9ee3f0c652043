// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake job executor for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ExecutorError, JobExecutor};
use async_trait::async_trait;
use dd_core::{Job, JobOutcome};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

enum Scripted {
    Outcome { exit_code: i32, output: String },
    Broken { reason: String },
}

#[derive(Default)]
struct FakeState {
    submitted: Vec<Job>,
    scripted: HashMap<String, VecDeque<Scripted>>,
}

/// Fake executor that records submissions in order and replays
/// scripted outcomes per job name. Unscripted jobs succeed with empty
/// output.
#[derive(Clone, Default)]
pub struct FakeExecutor {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful outcome with the given captured output.
    pub fn succeed_with(&self, job: impl Into<String>, output: impl Into<String>) {
        self.push(job.into(), Scripted::Outcome {
            exit_code: 0,
            output: output.into(),
        });
    }

    /// Script a failed outcome.
    pub fn fail_with(&self, job: impl Into<String>, exit_code: i32, output: impl Into<String>) {
        self.push(job.into(), Scripted::Outcome {
            exit_code,
            output: output.into(),
        });
    }

    /// Script an executor-level error (spawn failure, timeout).
    pub fn break_with(&self, job: impl Into<String>, reason: impl Into<String>) {
        self.push(job.into(), Scripted::Broken {
            reason: reason.into(),
        });
    }

    fn push(&self, job: String, scripted: Scripted) {
        self.inner
            .lock()
            .scripted
            .entry(job)
            .or_default()
            .push_back(scripted);
    }

    /// All jobs submitted so far, in submission order.
    pub fn submitted(&self) -> Vec<Job> {
        self.inner.lock().submitted.clone()
    }

    /// Names of submitted jobs, in submission order.
    pub fn submitted_names(&self) -> Vec<String> {
        self.inner
            .lock()
            .submitted
            .iter()
            .map(|j| j.name.clone())
            .collect()
    }

    /// The recorded submission for one job name, if any.
    pub fn submission(&self, name: &str) -> Option<Job> {
        self.inner
            .lock()
            .submitted
            .iter()
            .find(|j| j.name == name)
            .cloned()
    }
}

#[async_trait]
impl JobExecutor for FakeExecutor {
    async fn submit(&self, job: &Job) -> Result<JobOutcome, ExecutorError> {
        let mut state = self.inner.lock();
        state.submitted.push(job.clone());

        match state
            .scripted
            .get_mut(&job.name)
            .and_then(VecDeque::pop_front)
        {
            Some(Scripted::Outcome { exit_code, output }) => Ok(JobOutcome {
                job: job.name.clone(),
                exit_code,
                output,
            }),
            Some(Scripted::Broken { reason }) => Err(ExecutorError::StartFailed {
                job: job.name.clone(),
                reason,
            }),
            None => Ok(JobOutcome {
                job: job.name.clone(),
                exit_code: 0,
                output: String::new(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Containerized jobs and their outcomes

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One containerized unit of ordered shell tasks.
///
/// Task order is execution order and a later task may depend on side
/// effects of an earlier one (files, git state), so the sequence is
/// preserved exactly. Image and environment are fixed at construction;
/// nothing mutates a job after submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    pub image: String,
    pub tasks: Vec<String>,
    #[serde(default)]
    pub env: IndexMap<String, String>,
    /// Mount shared build storage so later jobs in the same build can
    /// read files this job leaves behind
    #[serde(default)]
    pub storage: bool,
}

impl Job {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            tasks: Vec::new(),
            env: IndexMap::new(),
            storage: false,
        }
    }

    /// Append one shell task. Tasks run in the order they were added.
    pub fn task(mut self, cmd: impl Into<String>) -> Self {
        self.tasks.push(cmd.into());
        self
    }

    pub fn tasks<I, S>(mut self, cmds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tasks.extend(cmds.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, val: impl Into<String>) -> Self {
        self.env.insert(key.into(), val.into());
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in vars {
            self.env.insert(k.into(), v.into());
        }
        self
    }

    pub fn storage(mut self, enabled: bool) -> Self {
        self.storage = enabled;
        self
    }
}

/// Result of running one job to completion.
///
/// A non-zero exit is a normal outcome, not an error — executor-level
/// failures (spawn, timeout) are reported separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutcome {
    /// Name of the job that produced this outcome
    pub job: String,
    pub exit_code: i32,
    /// Combined stdout/stderr captured from the job's tasks
    pub output: String,
}

impl JobOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Captured output with surrounding whitespace stripped.
    ///
    /// Handlers that consume a job's output (commit SHA capture) read
    /// it through this, matching the trailing-newline reality of
    /// `git rev-parse`-style commands.
    pub fn output_trimmed(&self) -> &str {
        self.output.trim()
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline definitions
//!
//! A [`PipelineSet`] maps event kinds to pipeline definitions. Each
//! definition is an ordered list of [`StageDef`]s — a job template plus
//! its dependency policy — interpreted by the engine. Template strings
//! carry `${...}` placeholders resolved only at submission time, so
//! secrets never live inside a definition.

use crate::template::{interpolate, interpolate_shell};
use dd_core::{EventKind, Job};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors found by [`PipelineSet::validate`]
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("pipeline {pipeline}: duplicate stage name {stage}")]
    DuplicateStage { pipeline: String, stage: String },
    #[error("pipeline {pipeline}: stage {stage} needs {needs}, which is not an earlier stage")]
    UnknownDependency {
        pipeline: String,
        stage: String,
        needs: String,
    },
    #[error("pipeline {pipeline}: stage {stage} declares needs under the all policy")]
    DependencyUnderAll { pipeline: String, stage: String },
    #[error("pipeline {pipeline}: stage {stage} has no tasks and no env")]
    EmptyStage { pipeline: String, stage: String },
}

/// A job whose strings may contain `${...}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTemplate {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub env: IndexMap<String, String>,
    #[serde(default)]
    pub storage: bool,
}

impl JobTemplate {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            tasks: Vec::new(),
            env: IndexMap::new(),
            storage: false,
        }
    }

    pub fn task(mut self, cmd: impl Into<String>) -> Self {
        self.tasks.push(cmd.into());
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

    /// Render into a concrete [`Job`].
    ///
    /// Task placeholders are substituted with shell escaping (values
    /// land inside shell text); env values are substituted verbatim.
    /// Unknown placeholders are left as-is.
    pub fn render(&self, vars: &HashMap<String, String>) -> Job {
        let mut job = Job::new(&self.name, &self.image).storage(self.storage);
        for task in &self.tasks {
            job = job.task(interpolate_shell(task, vars));
        }
        for (key, val) in &self.env {
            job = job.env(key, interpolate(val, vars));
        }
        job
    }
}

/// How the jobs of one pipeline are handed to the executor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPolicy {
    /// Fire in order, wait for each before starting the next. Failure
    /// of one job does not prevent later jobs from running.
    #[default]
    Each,
    /// Fire all jobs concurrently; no ordering guarantee. Jobs must be
    /// independent and must not share a working directory.
    All,
}

/// One stage of a pipeline: a job template plus dependency policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDef {
    #[serde(flatten)]
    pub job: JobTemplate,
    /// Name of an earlier stage whose completion (and captured output,
    /// via `${output.<stage>}` / `${output.<stage>.short}`) this stage
    /// depends on. If that stage fails or is skipped, this stage is
    /// skipped with a failed-dependency outcome.
    #[serde(default)]
    pub needs: Option<String>,
    /// Best-effort notification stage: dropped wholesale when the
    /// pipeline set has notifications disabled, and its failure is
    /// never escalated.
    #[serde(default)]
    pub notify: bool,
}

impl StageDef {
    pub fn job(job: JobTemplate) -> Self {
        Self {
            job,
            needs: None,
            notify: false,
        }
    }

    pub fn needs(mut self, stage: impl Into<String>) -> Self {
        self.needs = Some(stage.into());
        self
    }

    pub fn notify(mut self) -> Self {
        self.notify = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.job.name
    }
}

/// A pipeline definition: ordered stages plus a run policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDef {
    #[serde(default)]
    pub policy: RunPolicy,
    #[serde(default)]
    pub stages: Vec<StageDef>,
}

impl PipelineDef {
    pub fn new(policy: RunPolicy) -> Self {
        Self {
            policy,
            stages: Vec::new(),
        }
    }

    pub fn stage(mut self, stage: StageDef) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn get_stage(&self, name: &str) -> Option<&StageDef> {
        self.stages.iter().find(|s| s.name() == name)
    }

    /// Stages that actually run for this event, honoring the
    /// notifications flag.
    pub fn active_stages(&self, notifications: bool) -> impl Iterator<Item = &StageDef> {
        self.stages
            .iter()
            .filter(move |s| notifications || !s.notify)
    }
}

/// All pipelines for one deployment, keyed by triggering event kind.
///
/// `notifications` is the single flag that selects between the minimal
/// and the notification-rich variants of the same pipelines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSet {
    #[serde(default = "default_notifications")]
    pub notifications: bool,
    #[serde(default)]
    pub pipelines: IndexMap<EventKind, PipelineDef>,
}

fn default_notifications() -> bool {
    true
}

impl Default for PipelineSet {
    fn default() -> Self {
        Self {
            notifications: true,
            pipelines: IndexMap::new(),
        }
    }
}

impl PipelineSet {
    pub fn new(notifications: bool) -> Self {
        Self {
            notifications,
            pipelines: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, kind: EventKind, def: PipelineDef) {
        self.pipelines.insert(kind, def);
    }

    pub fn with(mut self, kind: EventKind, def: PipelineDef) -> Self {
        self.insert(kind, def);
        self
    }

    pub fn get(&self, kind: &EventKind) -> Option<&PipelineDef> {
        self.pipelines.get(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &EventKind> {
        self.pipelines.keys()
    }

    /// Check structural invariants: unique stage names, `needs` only
    /// referencing earlier stages, no dependencies under the all
    /// policy, no empty stages.
    pub fn validate(&self) -> Result<(), ValidateError> {
        for (kind, def) in &self.pipelines {
            let pipeline = kind.to_string();
            let mut seen: Vec<&str> = Vec::new();
            for stage in &def.stages {
                if seen.contains(&stage.name()) {
                    return Err(ValidateError::DuplicateStage {
                        pipeline,
                        stage: stage.name().to_string(),
                    });
                }
                if stage.job.tasks.is_empty() && stage.job.env.is_empty() {
                    return Err(ValidateError::EmptyStage {
                        pipeline,
                        stage: stage.name().to_string(),
                    });
                }
                if let Some(needs) = &stage.needs {
                    if def.policy == RunPolicy::All {
                        return Err(ValidateError::DependencyUnderAll {
                            pipeline,
                            stage: stage.name().to_string(),
                        });
                    }
                    if !seen.contains(&needs.as_str()) {
                        return Err(ValidateError::UnknownDependency {
                            pipeline,
                            stage: stage.name().to_string(),
                            needs: needs.clone(),
                        });
                    }
                }
                seen.push(stage.name());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "def_tests.rs"]
mod tests;

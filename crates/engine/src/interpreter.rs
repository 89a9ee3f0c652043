// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline interpreter
//!
//! Walks a [`PipelineDef`] for one event: builds the variable map,
//! renders each stage's job template at submission time, tracks
//! captured outputs for dependent stages, and applies the run policy.
//! Stage output becomes available to later stages as
//! `${output.<stage>}` and `${output.<stage>.short}`.

use crate::error::EngineError;
use crate::group::PipelineGroup;
use crate::Handler;
use async_trait::async_trait;
use dd_adapters::JobExecutor;
use dd_core::{BuildId, Event, EventKind, ImageAction, JobOutcome, Project, ShortId};
use dd_pipeline::{PipelineDef, PipelineSet, RunPolicy, StageDef};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// What happened to one stage of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
    /// The job ran to completion (its exit code may still be non-zero)
    Ran(JobOutcome),
    /// The needed stage failed or was skipped, so this stage's job was
    /// never constructed
    SkippedDependency { needs: String },
    /// The executor could not run the job at all
    Broken(String),
}

/// Outcome of one stage, with enough context for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    pub stage: String,
    pub notify: bool,
    pub status: StageStatus,
}

impl StageOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(&self.status, StageStatus::Ran(outcome) if outcome.success())
    }
}

/// Report of one pipeline run for one event.
#[derive(Debug, Clone, Default)]
pub struct PipelineRun {
    pub kind: String,
    pub build_id: BuildId,
    /// Set when a payload guard decided the event needs no jobs
    pub not_run: Option<String>,
    pub stages: Vec<StageOutcome>,
}

impl PipelineRun {
    fn for_event(event: &Event) -> Self {
        Self {
            kind: event.kind.to_string(),
            build_id: event.build_id.clone(),
            not_run: None,
            stages: Vec::new(),
        }
    }

    fn not_run(event: &Event, reason: impl Into<String>) -> Self {
        let mut run = Self::for_event(event);
        run.not_run = Some(reason.into());
        run
    }

    /// True when a stage that is not best-effort failed or was skipped.
    pub fn has_blocking_failure(&self) -> bool {
        self.stages.iter().any(|s| !s.notify && !s.succeeded())
    }
}

/// Shared log of pipeline runs, read back by the caller after a batch
/// of events has been dispatched.
#[derive(Clone, Default)]
pub struct RunLog {
    inner: Arc<Mutex<Vec<PipelineRun>>>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, run: PipelineRun) {
        self.inner.lock().push(run);
    }

    pub fn runs(&self) -> Vec<PipelineRun> {
        self.inner.lock().clone()
    }
}

/// Variables every pipeline can reference for one event. Planning
/// tools overwrite the `secret.*` entries before rendering previews.
pub fn event_vars(event: &Event, project: &Project) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    vars.insert("event.build_id".to_string(), event.build_id.to_string());
    vars.insert("event.commit".to_string(), event.revision.commit.clone());
    vars.insert(
        "event.short_commit".to_string(),
        event.revision.short_commit().to_string(),
    );
    vars.insert("event.ref".to_string(), event.revision.git_ref.clone());
    vars.insert("project.name".to_string(), project.name.clone());
    vars.insert("project.clone_url".to_string(), project.clone_url.clone());
    for (key, secret) in project.secrets.iter() {
        // Secrets enter the variable map only here, at render time
        vars.insert(format!("secret.{key}"), secret.expose().to_string());
    }
    vars
}

/// Interpret one pipeline definition for one event.
pub async fn run_pipeline<E: JobExecutor>(
    def: &PipelineDef,
    notifications: bool,
    vars: &HashMap<String, String>,
    event: &Event,
    executor: &E,
) -> PipelineRun {
    let mut run = PipelineRun::for_event(event);

    match def.policy {
        RunPolicy::Each => {
            let mut vars = vars.clone();
            // stage name -> whether it completed successfully
            let mut succeeded: HashMap<&str, bool> = HashMap::new();

            for stage in def.active_stages(notifications) {
                let name = stage.name();

                if let Some(needs) = &stage.needs {
                    if !succeeded.get(needs.as_str()).copied().unwrap_or(false) {
                        tracing::warn!(stage = name, needs = %needs, "dependency did not succeed, skipping stage");
                        succeeded.insert(name, false);
                        run.stages.push(StageOutcome {
                            stage: name.to_string(),
                            notify: stage.notify,
                            status: StageStatus::SkippedDependency {
                                needs: needs.clone(),
                            },
                        });
                        continue;
                    }
                }

                // Deferred construction: the job is rendered only once
                // its dependencies' outputs are in the variable map
                let job = stage.job.render(&vars);
                let status = match executor.submit(&job).await {
                    Ok(outcome) => {
                        let output = outcome.output_trimmed().to_string();
                        vars.insert(format!("output.{name}.short"), output.short(7).to_string());
                        vars.insert(format!("output.{name}"), output);
                        succeeded.insert(name, outcome.success());
                        StageStatus::Ran(outcome)
                    }
                    Err(e) => {
                        tracing::error!(stage = name, error = %e, "executor failed to run stage");
                        succeeded.insert(name, false);
                        StageStatus::Broken(e.to_string())
                    }
                };
                run.stages.push(StageOutcome {
                    stage: name.to_string(),
                    notify: stage.notify,
                    status,
                });
            }
        }

        RunPolicy::All => {
            // Independent jobs: render everything upfront and fire
            let stages: Vec<&StageDef> = def.active_stages(notifications).collect();
            let mut group = PipelineGroup::new();
            for stage in &stages {
                group.add(stage.job.render(vars));
            }
            let outcomes = group.run_all(executor).await;

            for stage in stages {
                let status = outcomes
                    .iter()
                    .find(|o| o.job == stage.name())
                    .cloned()
                    .map_or_else(
                        || StageStatus::Broken("no outcome reported".to_string()),
                        StageStatus::Ran,
                    );
                run.stages.push(StageOutcome {
                    stage: stage.name().to_string(),
                    notify: stage.notify,
                    status,
                });
            }
        }
    }

    for stage in &run.stages {
        tracing::info!(
            pipeline = %run.kind,
            stage = %stage.stage,
            ok = stage.succeeded(),
            "stage finished"
        );
    }
    run
}

/// Handler that interprets the configured pipeline set for each event.
pub struct PipelineHandler<E> {
    set: PipelineSet,
    executor: E,
    log: RunLog,
}

impl<E: JobExecutor> PipelineHandler<E> {
    pub fn new(set: PipelineSet, executor: E, log: RunLog) -> Self {
        Self { set, executor, log }
    }
}

#[async_trait]
impl<E: JobExecutor> Handler for PipelineHandler<E> {
    async fn handle(&self, event: &Event, project: &Project) -> Result<(), EngineError> {
        let Some(def) = self.set.get(&event.kind) else {
            // Registration and definitions normally agree; nothing to do
            tracing::debug!(event = %event.kind, "no pipeline defined");
            return Ok(());
        };

        let mut vars = event_vars(event, project);

        if event.kind == EventKind::GcrImagePush {
            let payload = event
                .image_push_payload()
                .map_err(|source| EngineError::Payload {
                    event: event.kind.to_string(),
                    source,
                })?;
            if payload.image_data.action != ImageAction::Insert {
                let reason = format!(
                    "registry action {:?} for {} needs no pipeline",
                    payload.image_data.action, payload.image_data.tag
                );
                tracing::info!(event = %event.kind, %reason, "not running");
                self.log.push(PipelineRun::not_run(event, reason));
                return Ok(());
            }
            vars.insert("event.image".to_string(), payload.image_data.tag);
        }

        let run = run_pipeline(def, self.set.notifications, &vars, event, &self.executor).await;
        self.log.push(run);
        Ok(())
    }
}

#[cfg(test)]
#[path = "interpreter_tests.rs"]
mod tests;

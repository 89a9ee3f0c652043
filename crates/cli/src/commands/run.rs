// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `drydock run` — dispatch events through the configured pipelines
//!
//! Events are processed strictly one at a time: each dispatch completes
//! (including all its jobs) before the next event is read off the
//! batch. Exit is non-zero when any non-notification stage failed.

use crate::config::DrydockConfig;
use crate::events::parse_events;
use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use dd_adapters::{DockerExecutor, JobExecutor, ProcessExecutor};
use dd_core::{Event, UuidIdGen};
use dd_engine::{gitops_dispatcher, DispatchOutcome, StageStatus};
use std::io::Read;

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum ExecutorKind {
    /// Run jobs in ephemeral Docker containers
    Docker,
    /// Run jobs as plain host processes (development only)
    Process,
}

#[derive(Args)]
pub struct RunArgs {
    /// Newline-delimited JSON events file; use - for stdin
    #[arg(long, default_value = "-")]
    pub events: String,
    #[arg(long, value_enum, default_value = "docker")]
    pub executor: ExecutorKind,
    /// Project context; defaults to settings.default_project
    #[arg(long)]
    pub project: Option<String>,
}

pub async fn run(config: DrydockConfig, args: RunArgs) -> Result<()> {
    let input = if args.events == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read events from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(&args.events)
            .with_context(|| format!("failed to read {}", args.events))?
    };
    let events = parse_events(&input, &UuidIdGen)?;
    let project = config.resolve_project_name(args.project.as_deref())?;

    match args.executor {
        ExecutorKind::Docker => {
            dispatch_all(&config, &events, &project, DockerExecutor::new()).await
        }
        ExecutorKind::Process => {
            dispatch_all(&config, &events, &project, ProcessExecutor::new()).await
        }
    }
}

async fn dispatch_all<E: JobExecutor>(
    config: &DrydockConfig,
    events: &[Event],
    project: &str,
    executor: E,
) -> Result<()> {
    let (dispatcher, log) =
        gitops_dispatcher(config.project_store(), config.pipelines(), executor);

    for event in events {
        match dispatcher.dispatch(event, project).await? {
            DispatchOutcome::Handled => {}
            DispatchOutcome::Unhandled => println!("{}: dropped (no handler)", event.kind),
            DispatchOutcome::Failed(message) => {
                println!("{}: handler failed: {message}", event.kind)
            }
        }
    }

    let mut blocked = false;
    for run in log.runs() {
        if let Some(reason) = &run.not_run {
            println!("{}: not run ({reason})", run.kind);
            continue;
        }
        for stage in &run.stages {
            match &stage.status {
                StageStatus::Ran(outcome) if outcome.success() => {
                    println!("{}/{}: ok", run.kind, stage.stage);
                }
                StageStatus::Ran(outcome) => {
                    println!(
                        "{}/{}: failed (exit {})",
                        run.kind, stage.stage, outcome.exit_code
                    );
                }
                StageStatus::SkippedDependency { needs } => {
                    println!("{}/{}: skipped (needs {needs})", run.kind, stage.stage);
                }
                StageStatus::Broken(reason) => {
                    println!("{}/{}: broken: {reason}", run.kind, stage.stage);
                }
            }
        }
        blocked |= run.has_blocking_failure();
    }

    if blocked {
        bail!("one or more pipeline stages failed");
    }
    Ok(())
}

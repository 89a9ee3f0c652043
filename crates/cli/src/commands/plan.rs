// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `drydock plan` — render the jobs an event would produce
//!
//! Secrets are replaced with `[redacted]` before rendering and stage
//! outputs are not available, so `${output.*}` placeholders stay
//! visible in the preview.

use crate::config::DrydockConfig;
use crate::events::parse_event;
use anyhow::{Context, Result};
use clap::Args;
use dd_core::{Event, EventKind, ImageAction, Job, UuidIdGen};
use dd_engine::event_vars;
use std::path::PathBuf;

#[derive(Args)]
pub struct PlanArgs {
    /// JSON file holding one inbound event
    #[arg(long)]
    pub event: PathBuf,
    /// Project context; defaults to settings.default_project
    #[arg(long)]
    pub project: Option<String>,
}

pub fn plan(config: &DrydockConfig, args: &PlanArgs) -> Result<()> {
    let source = std::fs::read_to_string(&args.event)
        .with_context(|| format!("failed to read {}", args.event.display()))?;
    let event = parse_event(&source, &UuidIdGen)?;

    let project_name = config.resolve_project_name(args.project.as_deref())?;
    let store = config.project_store();
    let project = store.resolve(&project_name)?;
    let set = config.pipelines();

    let Some(def) = set.get(&event.kind) else {
        println!("{}: dropped (no pipeline)", event.kind);
        return Ok(());
    };

    let mut vars = event_vars(&event, project);
    for (key, _) in project.secrets.iter() {
        vars.insert(format!("secret.{key}"), "[redacted]".to_string());
    }
    if event.kind == EventKind::GcrImagePush {
        let payload = event.image_push_payload()?;
        if payload.image_data.action != ImageAction::Insert {
            println!(
                "{}: not run (registry action {:?})",
                event.kind, payload.image_data.action
            );
            return Ok(());
        }
        vars.insert("event.image".to_string(), payload.image_data.tag);
    }

    let jobs: Vec<Job> = def
        .active_stages(set.notifications)
        .map(|stage| stage.job.render(&vars))
        .collect();

    println!("{}: {} job(s)", event.kind, jobs.len());
    for (index, job) in jobs.iter().enumerate() {
        print_job(index + 1, job);
    }
    Ok(())
}

fn print_job(position: usize, job: &Job) {
    let mut line = format!("[{position}] {}  image={}", job.name, job.image);
    if job.storage {
        line.push_str("  storage=on");
    }
    if !job.env.is_empty() {
        let keys: Vec<&str> = job.env.keys().map(String::as_str).collect();
        line.push_str(&format!("  env={}", keys.join(",")));
    }
    println!("{line}");
    for task in &job.tasks {
        for (i, text) in task.lines().enumerate() {
            if i == 0 {
                println!("    $ {text}");
            } else {
                println!("      {text}");
            }
        }
    }
}

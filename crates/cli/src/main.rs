// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! drydock - GitOps pipeline orchestrator CLI
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

mod commands;
mod config;
mod events;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::DrydockConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "drydock",
    version,
    about = "Drydock - event-driven GitOps deployment pipelines"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "Drydock.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch events from a file or stdin through the pipelines
    Run(commands::run::RunArgs),
    /// Show the jobs an event would produce, without executing
    Plan(commands::plan::PlanArgs),
    /// Apply the manifest image patch locally
    Patch(commands::patch::PatchArgs),
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr; stdout is reserved for command output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => {
            let config = DrydockConfig::load(&cli.config)?;
            commands::run::run(config, args).await
        }
        Commands::Plan(args) => {
            let config = DrydockConfig::load(&cli.config)?;
            commands::plan::plan(&config, &args)
        }
        Commands::Patch(args) => commands::patch::patch(&args),
    }
}

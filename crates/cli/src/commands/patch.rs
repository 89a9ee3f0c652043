// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `drydock patch` — preview or apply the manifest image patch locally

use anyhow::{Context, Result};
use clap::Args;
use dd_pipeline::patch_container_image;
use std::path::PathBuf;

#[derive(Args)]
pub struct PatchArgs {
    /// Deployment manifest to patch
    #[arg(long)]
    pub manifest: PathBuf,
    /// Container name the patch targets
    #[arg(long)]
    pub container: String,
    /// New image value
    #[arg(long)]
    pub image: String,
    /// Rewrite the manifest in place instead of printing the result
    #[arg(long)]
    pub write: bool,
}

pub fn patch(args: &PatchArgs) -> Result<()> {
    let manifest = std::fs::read_to_string(&args.manifest)
        .with_context(|| format!("failed to read {}", args.manifest.display()))?;

    let patched = patch_container_image(&manifest, &args.container, &args.image)?;

    if args.write {
        std::fs::write(&args.manifest, &patched)
            .with_context(|| format!("failed to write {}", args.manifest.display()))?;
        println!("patched {}", args.manifest.display());
    } else {
        print!("{patched}");
    }
    Ok(())
}

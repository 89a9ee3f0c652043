// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration file loading
//!
//! One `Drydock.toml` replaces the near-duplicate pipeline script
//! revisions: the `[gitops]` table parameterizes the standard
//! pipelines (including the notifications flag), and `[project.*]`
//! tables hold per-project repository coordinates and secrets.

use anyhow::{bail, Context, Result};
use dd_core::Project;
use dd_engine::ProjectStore;
use dd_pipeline::{standard_pipelines, GitOpsConfig, PipelineSet};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Project used when --project is not given
    #[serde(default)]
    pub default_project: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DrydockConfig {
    #[serde(default)]
    pub settings: Settings,
    pub gitops: GitOpsConfig,
    #[serde(default)]
    pub project: IndexMap<String, Project>,
}

impl DrydockConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&source)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config
            .pipelines()
            .validate()
            .context("invalid pipeline definitions")?;
        if config.project.is_empty() {
            bail!("config defines no [project.*] tables");
        }
        Ok(config)
    }

    pub fn project_store(&self) -> ProjectStore {
        let mut store = ProjectStore::new();
        for (name, project) in &self.project {
            store.insert(name, project.clone());
        }
        store
    }

    pub fn pipelines(&self) -> PipelineSet {
        standard_pipelines(&self.gitops)
    }

    /// The project a command should run under: the --project flag if
    /// given, else the configured default, else the only project.
    pub fn resolve_project_name(&self, flag: Option<&str>) -> Result<String> {
        if let Some(name) = flag {
            return Ok(name.to_string());
        }
        if let Some(name) = &self.settings.default_project {
            return Ok(name.clone());
        }
        if self.project.len() == 1 {
            if let Some(name) = self.project.keys().next() {
                return Ok(name.clone());
            }
        }
        bail!("multiple projects configured; pass --project or set settings.default_project")
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project context store

use crate::error::EngineError;
use dd_core::Project;
use indexmap::IndexMap;

/// Read-only lookup of per-project configuration.
///
/// Loaded once from TOML; projects may change between events but are
/// immutable during one event's processing. Secrets inside resolved
/// projects stay redacted in all Debug output.
#[derive(Debug, Clone, Default)]
pub struct ProjectStore {
    projects: IndexMap<String, Project>,
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a store from TOML tables keyed by project name:
    ///
    /// ```toml
    /// [example]
    /// clone_url = "https://github.com/example/repo.git"
    /// [example.secrets]
    /// GITHUB_TOKEN = "..."
    /// ```
    pub fn from_toml(source: &str) -> Result<Self, EngineError> {
        let parsed: IndexMap<String, Project> =
            toml::from_str(source).map_err(|e| EngineError::ProjectConfig(e.to_string()))?;
        let mut store = Self::new();
        for (name, project) in parsed {
            store.insert(name, project);
        }
        Ok(store)
    }

    /// Add a project under the given name. The name wins over whatever
    /// the project struct carried.
    pub fn insert(&mut self, name: impl Into<String>, mut project: Project) {
        let name = name.into();
        project.name = name.clone();
        self.projects.insert(name, project);
    }

    pub fn with(mut self, name: impl Into<String>, project: Project) -> Self {
        self.insert(name, project);
        self
    }

    pub fn resolve(&self, name: &str) -> Result<&Project, EngineError> {
        self.projects
            .get(name)
            .ok_or_else(|| EngineError::ProjectNotFound(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.projects.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

#[cfg(test)]
#[path = "projects_tests.rs"]
mod tests;

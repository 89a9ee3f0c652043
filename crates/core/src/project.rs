// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project context: repository coordinates and opaque secrets

use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;

/// An opaque secret value.
///
/// `Debug` and `Display` render `[redacted]`; the raw value is only
/// reachable through [`Secret::expose`], called at job-render time.
/// There is deliberately no `Serialize` implementation.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the raw value. Call sites are the audit surface.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[redacted]")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[redacted]")
    }
}

/// Named secrets for one project. Keys are unique; insertion order is
/// preserved so rendered job environments are deterministic.
#[derive(Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Secrets(IndexMap<String, Secret>);

impl Secrets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), Secret::new(value));
    }

    pub fn get(&self, key: &str) -> Option<&Secret> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Secret)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keys only; values stay opaque
        f.debug_list().entries(self.0.keys()).finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Secrets {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut secrets = Secrets::new();
        for (k, v) in iter {
            secrets.insert(k, v);
        }
        secrets
    }
}

/// Per-project configuration resolved for each event.
///
/// Read-only during a single event's processing.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub name: String,
    pub clone_url: String,
    #[serde(default)]
    pub secrets: Secrets,
}

impl Project {
    pub fn new(name: impl Into<String>, clone_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clone_url: clone_url.into(),
            secrets: Secrets::new(),
        }
    }

    pub fn with_secret(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(key, value);
        self
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;

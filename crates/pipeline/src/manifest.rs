// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Strategic-merge image patch for deployment manifests
//!
//! Mirrors what the infra job's `kubectl patch --local` does, so the
//! resulting manifest can be previewed (and tested) without a kubectl
//! binary: find one container by name under
//! `spec.template.spec.containers` and replace its `image` field,
//! leaving everything else untouched. Applying the same patch twice
//! yields an identical document.

use serde_yaml::Value;
use thiserror::Error;

/// Errors from patching a deployment manifest
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("manifest has no spec.template.spec.containers list")]
    MissingContainers,
    #[error("no container named {0} in manifest")]
    ContainerNotFound(String),
}

/// The strategic-merge patch document naming one container and its new
/// image, as written to `patch.yaml` inside the infra job.
pub fn image_patch_yaml(container: &str, image: &str) -> String {
    format!(
        "spec:\n  template:\n    spec:\n      containers:\n        - name: {container}\n          image: {image}\n"
    )
}

/// Apply the image patch locally to a deployment manifest.
///
/// Returns the re-serialized manifest with only the named container's
/// `image` field replaced. Errors if the containers list is missing or
/// no container carries the given name.
pub fn patch_container_image(
    manifest: &str,
    container: &str,
    image: &str,
) -> Result<String, ManifestError> {
    let mut doc: Value = serde_yaml::from_str(manifest)?;

    let containers = doc
        .get_mut("spec")
        .and_then(|v| v.get_mut("template"))
        .and_then(|v| v.get_mut("spec"))
        .and_then(|v| v.get_mut("containers"))
        .and_then(Value::as_sequence_mut)
        .ok_or(ManifestError::MissingContainers)?;

    let name_key = Value::from("name");
    let target = containers
        .iter_mut()
        .filter_map(Value::as_mapping_mut)
        .find(|c| c.get(&name_key).and_then(Value::as_str) == Some(container))
        .ok_or_else(|| ManifestError::ContainerNotFound(container.to_string()))?;

    target.insert(Value::from("image"), Value::from(image));

    Ok(serde_yaml::to_string(&doc)?)
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;

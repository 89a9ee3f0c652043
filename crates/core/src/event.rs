// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound events from the host build runtime

use crate::id::{BuildId, ShortId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Errors from decoding an event payload
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The closed set of event names the orchestrator knows about.
///
/// Anything else parses to `Unknown` rather than failing — unmatched
/// events are dropped explicitly by the dispatcher, never rejected at
/// the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Commit pushed to the GitOps repository
    Push,
    /// Container image pushed to the registry
    GcrImagePush,
    /// All jobs for a build have finished
    After,
    /// A handler failed while processing an event
    Error,
    /// Manual trigger (`brig run` equivalent)
    Exec,
    /// Any event name not listed above
    Unknown(String),
}

impl EventKind {
    pub fn parse(name: &str) -> Self {
        match name {
            "push" => EventKind::Push,
            "gcr_image_push" => EventKind::GcrImagePush,
            "after" => EventKind::After,
            "error" => EventKind::Error,
            "exec" => EventKind::Exec,
            other => EventKind::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Push => "push",
            EventKind::GcrImagePush => "gcr_image_push",
            EventKind::After => "after",
            EventKind::Error => "error",
            EventKind::Exec => "exec",
            EventKind::Unknown(name) => name,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, EventKind::Unknown(_))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for EventKind {
    fn from(s: &str) -> Self {
        EventKind::parse(s)
    }
}

impl Serialize for EventKind {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let name = String::deserialize(d)?;
        Ok(EventKind::parse(&name))
    }
}

/// Source revision the event refers to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    #[serde(default)]
    pub commit: String,
    #[serde(default, rename = "ref")]
    pub git_ref: String,
}

impl Revision {
    /// First 7 characters of the commit SHA, as used in notification links.
    pub fn short_commit(&self) -> &str {
        self.commit.short(7)
    }
}

/// One event delivered by the host runtime.
///
/// Wire shape: `{"type": ..., "buildID": ..., "payload": "<json string>",
/// "revision": {"commit": ..., "ref": ...}}`. Immutable once dispatched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(rename = "buildID", default)]
    pub build_id: BuildId,
    /// Opaque JSON-encoded payload string; decoded per event kind
    #[serde(default)]
    pub payload: String,
    #[serde(default)]
    pub revision: Revision,
}

impl Event {
    pub fn new(kind: EventKind, build_id: impl Into<BuildId>) -> Self {
        Self {
            kind,
            build_id: build_id.into(),
            payload: String::new(),
            revision: Revision::default(),
        }
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn with_revision(mut self, commit: impl Into<String>, git_ref: impl Into<String>) -> Self {
        self.revision = Revision {
            commit: commit.into(),
            git_ref: git_ref.into(),
        };
        self
    }

    /// Synthetic `error` event the dispatcher emits when a handler fails.
    pub fn handler_error(source: &Event, message: &str) -> Self {
        let payload = serde_json::json!({
            "event": source.kind.as_str(),
            "error": message,
        });
        Event::new(EventKind::Error, source.build_id.clone()).with_payload(payload.to_string())
    }

    /// Decode the registry push payload (`{"imageData": {...}}`).
    pub fn image_push_payload(&self) -> Result<ImagePushPayload, PayloadError> {
        Ok(serde_json::from_str(&self.payload)?)
    }

    pub fn log_summary(&self) -> String {
        format!("{} build={}", self.kind, self.build_id.short(12))
    }
}

/// Action reported by the container registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageAction {
    #[serde(rename = "INSERT")]
    Insert,
    #[serde(rename = "DELETE")]
    Delete,
    #[serde(other)]
    Other,
}

/// Registry image description inside a `gcr_image_push` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    pub action: ImageAction,
    pub tag: String,
}

/// Decoded payload of a `gcr_image_push` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePushPayload {
    #[serde(rename = "imageData")]
    pub image_data: ImageData,
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use thiserror::Error;

/// Errors that can occur while dispatching an event
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("project not found: {0}")]
    ProjectNotFound(String),
    #[error("invalid project config: {0}")]
    ProjectConfig(String),
    #[error("bad payload for {event} event: {source}")]
    Payload {
        event: String,
        #[source]
        source: dd_core::PayloadError,
    },
    #[error("executor error: {0}")]
    Executor(#[from] dd_adapters::ExecutorError),
}

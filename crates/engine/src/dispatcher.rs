// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event dispatcher
//!
//! Matches incoming events to registered handlers by exact event kind.
//! Dispatch is synchronous per event: the handler completes before the
//! dispatcher returns, so the caller feeds the next event only after
//! the previous one is fully processed. There is no cross-event memory.

use crate::error::EngineError;
use crate::interpreter::{PipelineHandler, RunLog};
use crate::projects::ProjectStore;
use async_trait::async_trait;
use dd_adapters::JobExecutor;
use dd_core::{Event, EventKind, Project};
use dd_pipeline::PipelineSet;
use std::collections::HashMap;
use std::sync::Arc;

/// A registered event handler.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, event: &Event, project: &Project) -> Result<(), EngineError>;
}

/// What the dispatcher did with one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler ran to completion
    Handled,
    /// No handler registered for this kind; the event was dropped
    Unhandled,
    /// The handler failed; the failure was routed to the error handler
    Failed(String),
}

/// Dispatches events to handlers with resolved project context.
pub struct Dispatcher {
    store: ProjectStore,
    handlers: HashMap<EventKind, Arc<dyn Handler>>,
}

impl Dispatcher {
    pub fn new(store: ProjectStore) -> Self {
        Self {
            store,
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for an event kind. Only one handler per kind
    /// is active at a time — the last registration wins.
    pub fn on(&mut self, kind: EventKind, handler: Arc<dyn Handler>) {
        self.handlers.insert(kind, handler);
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    /// Dispatch one event under the named project's context.
    ///
    /// An unknown or unregistered event kind is an explicit no-op, not
    /// an error. Handler failures are caught and routed to the `error`
    /// handler; if that handler itself fails, the event is dropped with
    /// a logged warning. Only a missing project surfaces as `Err` —
    /// that is a configuration problem, not an event problem.
    pub async fn dispatch(
        &self,
        event: &Event,
        project_name: &str,
    ) -> Result<DispatchOutcome, EngineError> {
        let project = self.store.resolve(project_name)?;
        tracing::info!(event = %event.log_summary(), project = project_name, "dispatching");

        let Some(handler) = self.handlers.get(&event.kind) else {
            tracing::debug!(event = %event.kind, "no handler registered, dropping event");
            return Ok(DispatchOutcome::Unhandled);
        };

        match handler.handle(event, project).await {
            Ok(()) => Ok(DispatchOutcome::Handled),
            Err(e) => {
                let message = e.to_string();
                tracing::error!(event = %event.kind, error = %message, "handler failed");
                self.route_error(event, project, &message).await;
                Ok(DispatchOutcome::Failed(message))
            }
        }
    }

    /// Hand a handler failure to the `error` handler, swallowing any
    /// failure of the error handler itself.
    async fn route_error(&self, source: &Event, project: &Project, message: &str) {
        if source.kind == EventKind::Error {
            // The error handler is the end of the line
            tracing::warn!("error handler failed, dropping event");
            return;
        }
        let Some(handler) = self.handlers.get(&EventKind::Error) else {
            tracing::warn!("no error handler registered, dropping failed event");
            return;
        };
        let error_event = Event::handler_error(source, message);
        if let Err(e) = handler.handle(&error_event, project).await {
            tracing::warn!(error = %e, "error handler failed, dropping event");
        }
    }
}

/// Error handler that logs the failure and nothing else. Never fails.
#[derive(Debug, Clone, Default)]
pub struct LogErrorHandler;

#[async_trait]
impl Handler for LogErrorHandler {
    async fn handle(&self, event: &Event, _project: &Project) -> Result<(), EngineError> {
        tracing::error!(
            build = %event.build_id,
            payload = %event.payload,
            "error event"
        );
        Ok(())
    }
}

/// Wire a dispatcher for a pipeline set: one [`PipelineHandler`] is
/// registered for every event kind the set defines, plus the logging
/// `error` handler. Returns the run log to read results back from.
pub fn gitops_dispatcher<E: JobExecutor>(
    store: ProjectStore,
    set: PipelineSet,
    executor: E,
) -> (Dispatcher, RunLog) {
    let log = RunLog::new();
    let kinds: Vec<EventKind> = set.kinds().cloned().collect();
    let handler = Arc::new(PipelineHandler::new(set, executor, log.clone()));

    let mut dispatcher = Dispatcher::new(store);
    for kind in kinds {
        dispatcher.on(kind, handler.clone());
    }
    dispatcher.on(EventKind::Error, Arc::new(LogErrorHandler));
    (dispatcher, log)
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event intake
//!
//! Events arrive as newline-delimited JSON, one inbound event per
//! line. An event without a build ID gets one assigned at intake so
//! every downstream log line and notification can reference it.

use anyhow::{Context, Result};
use dd_core::{Event, IdGen};

/// Parse newline-delimited JSON events. Blank lines are skipped.
pub fn parse_events(input: &str, id_gen: &impl IdGen) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    for (number, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut event: Event = serde_json::from_str(line)
            .with_context(|| format!("bad event on line {}", number + 1))?;
        assign_build_id(&mut event, id_gen);
        events.push(event);
    }
    Ok(events)
}

/// Parse one event from a whole JSON document.
pub fn parse_event(input: &str, id_gen: &impl IdGen) -> Result<Event> {
    let mut event: Event = serde_json::from_str(input).context("bad event")?;
    assign_build_id(&mut event, id_gen);
    Ok(event)
}

fn assign_build_id(event: &mut Event, id_gen: &impl IdGen) {
    if event.build_id.as_str().is_empty() {
        event.build_id = id_gen.next().into();
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;

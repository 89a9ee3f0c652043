//! Specs for `drydock run`.
//!
//! These use the process executor, so pipeline jobs actually execute on
//! the host. The GitOps tasks fail there (no hub binary, no checkout),
//! which is exactly what the failure-path specs rely on.

use crate::prelude::*;

#[test]
fn run_unknown_event_is_dropped_without_error() {
    let ws = Workspace::new(true);
    let events = ws.write(
        "events.ndjson",
        r#"{"type": "pull_request", "buildID": "b1"}"#,
    );

    let stdout = run_ok(
        ws.cmd()
            .args(["run", "--executor", "process", "--events"])
            .arg(&events),
    );

    assert!(stdout.contains("pull_request: dropped (no handler)"), "got: {stdout}");
}

#[test]
fn run_reads_events_from_stdin_by_default() {
    let ws = Workspace::new(true);

    let stdout = run_ok(
        ws.cmd()
            .args(["run", "--executor", "process"])
            .write_stdin(r#"{"type": "smoke_test", "buildID": "b1"}"#),
    );

    assert!(stdout.contains("smoke_test: dropped (no handler)"), "got: {stdout}");
}

#[test]
fn run_image_delete_action_runs_nothing() {
    let ws = Workspace::new(true);
    let events = ws.write("events.ndjson", IMAGE_DELETE_EVENT);

    let stdout = run_ok(
        ws.cmd()
            .args(["run", "--executor", "process", "--events"])
            .arg(&events),
    );

    assert!(stdout.contains("gcr_image_push: not run"), "got: {stdout}");
}

#[test]
fn run_malformed_payload_drops_the_event_and_continues() {
    let ws = Workspace::new(true);
    let event = serde_json::json!({
        "type": "gcr_image_push",
        "buildID": "b-bad",
        "payload": "{not json",
    });
    let events = ws.write("events.ndjson", &event.to_string());

    let stdout = run_ok(
        ws.cmd()
            .args(["run", "--executor", "process", "--events"])
            .arg(&events),
    );

    assert!(stdout.contains("gcr_image_push: handler failed"), "got: {stdout}");
    assert!(stdout.contains("bad payload"));
}

#[test]
fn run_failed_stage_skips_dependents_and_exits_nonzero() {
    let ws = Workspace::new(true);
    let events = ws.write("events.ndjson", IMAGE_PUSH_EVENT);

    let (stdout, stderr) = run_fail(
        ws.cmd()
            .args(["run", "--executor", "process", "--events"])
            .arg(&events),
    );

    // The infra job fails on the host, and the dependency chain reports
    // distinct skipped outcomes instead of crashing
    assert!(
        stdout.contains("gcr_image_push/update-infra-config: failed (exit"),
        "got: {stdout}"
    );
    assert!(stdout.contains("gcr_image_push/capture-infra-commit: skipped (needs update-infra-config)"));
    assert!(stdout.contains("gcr_image_push/slack-notify-update-infra: skipped (needs capture-infra-commit)"));
    assert!(stderr.contains("one or more pipeline stages failed"), "got: {stderr}");
}

#[test]
fn run_failed_notification_does_not_fail_the_run() {
    let ws = Workspace::new(true);
    let events = ws.write("events.ndjson", r#"{"type": "after", "buildID": "b7"}"#);

    // /slack-notify does not exist on the host, so the notification job
    // fails; best-effort notifications never fail the run
    let stdout = run_ok(
        ws.cmd()
            .args(["run", "--executor", "process", "--events"])
            .arg(&events),
    );

    assert!(stdout.contains("after/slack-notify-after: failed (exit"), "got: {stdout}");
}

#[test]
fn run_processes_events_in_file_order() {
    let ws = Workspace::new(true);
    let events = ws.write(
        "events.ndjson",
        &format!("{}\n{}\n", r#"{"type": "first_thing", "buildID": "b1"}"#, IMAGE_DELETE_EVENT),
    );

    let stdout = run_ok(
        ws.cmd()
            .args(["run", "--executor", "process", "--events"])
            .arg(&events),
    );

    let dropped = stdout.find("first_thing: dropped").unwrap();
    let not_run = stdout.find("gcr_image_push: not run").unwrap();
    assert!(dropped < not_run, "got: {stdout}");
}

//! Specs for `drydock plan`.

use crate::prelude::*;

#[test]
fn plan_push_with_notifications_lists_deploy_then_notify() {
    let ws = Workspace::new(true);
    let event = ws.write("event.json", PUSH_EVENT);

    let stdout = run_ok(ws.cmd().args(["plan", "--event"]).arg(&event));

    assert!(stdout.contains("push: 2 job(s)"), "got: {stdout}");
    let deploy = stdout.find("deploy-to-staging").unwrap();
    let notify = stdout.find("slack-notify-deploy-staging").unwrap();
    assert!(deploy < notify);
    assert!(stdout.contains("image=gcr.io/cloud-builders/kubectl"));
    assert!(stdout.contains("env=SLACK_WEBHOOK,SLACK_TITLE,SLACK_MESSAGE,SLACK_COLOR"));
}

#[test]
fn plan_push_without_notifications_is_single_job() {
    let ws = Workspace::new(false);
    let event = ws.write("event.json", PUSH_EVENT);

    let stdout = run_ok(ws.cmd().args(["plan", "--event"]).arg(&event));

    assert!(stdout.contains("push: 1 job(s)"), "got: {stdout}");
    assert!(stdout.contains("deploy-to-staging"));
    assert!(!stdout.contains("slack-notify"));
}

#[test]
fn plan_image_push_shows_patch_and_commit_tasks() {
    let ws = Workspace::new(true);
    let event = ws.write("event.json", IMAGE_PUSH_EVENT);

    let stdout = run_ok(ws.cmd().args(["plan", "--event"]).arg(&event));

    assert!(stdout.contains("gcr_image_push: 3 job(s)"), "got: {stdout}");
    assert!(stdout.contains("kubectl patch --local"));
    assert!(stdout.contains("image: gcr.io/example/api:v2"));
    assert!(stdout.contains("git rev-parse HEAD"));
    assert!(stdout.contains("storage=on"));
}

#[test]
fn plan_redacts_secrets() {
    let ws = Workspace::new(true);
    let event = ws.write("event.json", IMAGE_PUSH_EVENT);

    let stdout = run_ok(ws.cmd().args(["plan", "--event"]).arg(&event));

    assert!(stdout.contains("oauth_token: [redacted]"), "got: {stdout}");
    assert!(!stdout.contains("ghp_sekret123"));
    assert!(!stdout.contains("sekret456"));
}

#[test]
fn plan_delete_action_plans_nothing() {
    let ws = Workspace::new(true);
    let event = ws.write("event.json", IMAGE_DELETE_EVENT);

    let stdout = run_ok(ws.cmd().args(["plan", "--event"]).arg(&event));
    assert!(stdout.contains("not run"), "got: {stdout}");
}

#[test]
fn plan_unknown_event_is_dropped() {
    let ws = Workspace::new(true);
    let event = ws.write("event.json", r#"{"type": "pull_request", "buildID": "b1"}"#);

    let stdout = run_ok(ws.cmd().args(["plan", "--event"]).arg(&event));
    assert!(stdout.contains("pull_request: dropped (no pipeline)"), "got: {stdout}");
}

//! Configuration and argument error specs.

use crate::prelude::*;

#[test]
fn missing_config_file_is_reported() {
    let ws = Workspace::new(true);
    let event = ws.write("event.json", PUSH_EVENT);

    let mut cmd = drydock();
    cmd.args(["--config", "Missing.toml", "plan", "--event"]).arg(&event);
    let (_, stderr) = run_fail(&mut cmd);

    assert!(stderr.contains("failed to read config"), "got: {stderr}");
}

#[test]
fn malformed_config_is_reported() {
    let ws = Workspace::new(true);
    let config = ws.write("Broken.toml", "[gitops\ncontainer_name = ");
    let event = ws.write("event.json", PUSH_EVENT);

    let mut cmd = drydock();
    cmd.arg("--config").arg(&config).args(["plan", "--event"]).arg(&event);
    let (_, stderr) = run_fail(&mut cmd);

    assert!(stderr.contains("failed to parse config"), "got: {stderr}");
}

#[test]
fn config_without_projects_is_rejected() {
    let ws = Workspace::new(true);
    let config = ws.write(
        "NoProjects.toml",
        r#"
[gitops]
container_name = "app"
bot_email = "bot@example.com"
bot_name = "Bot"
"#,
    );
    let event = ws.write("event.json", PUSH_EVENT);

    let mut cmd = drydock();
    cmd.arg("--config").arg(&config).args(["plan", "--event"]).arg(&event);
    let (_, stderr) = run_fail(&mut cmd);

    assert!(stderr.contains("no [project.*] tables"), "got: {stderr}");
}

#[test]
fn ambiguous_project_requires_a_flag() {
    let ws = Workspace::new(true);
    let config = ws.write(
        "Two.toml",
        r#"
[gitops]
container_name = "app"
bot_email = "bot@example.com"
bot_name = "Bot"

[project.one]
clone_url = "https://github.com/example/one.git"

[project.two]
clone_url = "https://github.com/example/two.git"
"#,
    );
    let event = ws.write("event.json", PUSH_EVENT);

    let mut cmd = drydock();
    cmd.arg("--config").arg(&config).args(["plan", "--event"]).arg(&event);
    let (_, stderr) = run_fail(&mut cmd);

    assert!(stderr.contains("pass --project"), "got: {stderr}");

    // The flag resolves the ambiguity
    let mut cmd = drydock();
    cmd.arg("--config")
        .arg(&config)
        .args(["plan", "--project", "two", "--event"])
        .arg(&event);
    run_ok(&mut cmd);
}

#[test]
fn bad_event_document_is_reported() {
    let ws = Workspace::new(true);
    let event = ws.write("event.json", "not json at all");

    let (_, stderr) = run_fail(ws.cmd().args(["plan", "--event"]).arg(&event));
    assert!(stderr.contains("bad event"), "got: {stderr}");
}

#[test]
fn bad_event_line_is_reported_with_its_line_number() {
    let ws = Workspace::new(true);
    let events = ws.write(
        "events.ndjson",
        "{\"type\": \"after\"}\n{oops",
    );

    let (_, stderr) = run_fail(
        ws.cmd()
            .args(["run", "--executor", "process", "--events"])
            .arg(&events),
    );
    assert!(stderr.contains("bad event on line 2"), "got: {stderr}");
}

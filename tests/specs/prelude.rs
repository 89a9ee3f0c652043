//! Test helpers for behavioral specifications.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;

/// Returns a Command configured to run the drydock binary.
pub fn drydock() -> Command {
    Command::cargo_bin("drydock").unwrap()
}

/// Run the command, assert success, return stdout.
pub fn run_ok(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

/// Run the command, assert failure, return (stdout, stderr).
pub fn run_fail(cmd: &mut Command) -> (String, String) {
    let output = cmd.assert().failure().get_output().clone();
    (
        String::from_utf8(output.stdout).unwrap(),
        String::from_utf8(output.stderr).unwrap(),
    )
}

/// A scratch directory seeded with a Drydock.toml.
pub struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new(notifications: bool) -> Self {
        let workspace = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        workspace.write(
            "Drydock.toml",
            &format!(
                r#"
[settings]
default_project = "gitops-hello-world"

[gitops]
container_name = "gitops-hello-world"
bot_email = "gitops-bot@example.com"
bot_name = "GitOps Bot"
notifications = {notifications}

[project.gitops-hello-world]
clone_url = "https://github.com/example/gitops-hello-world.git"

[project.gitops-hello-world.secrets]
GITHUB_USERNAME = "gitops-bot"
GITHUB_TOKEN = "ghp_sekret123"
SLACK_WEBHOOK = "https://hooks.example.com/T0/B0/sekret456"
KASHTI_URL = "https://kashti.example.com"
"#
            ),
        );
        workspace
    }

    pub fn config(&self) -> PathBuf {
        self.dir.path().join("Drydock.toml")
    }

    /// Write a file into the workspace and return its path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Command pre-configured with this workspace's config file.
    pub fn cmd(&self) -> Command {
        let mut cmd = drydock();
        cmd.arg("--config").arg(self.config());
        cmd
    }
}

pub const PUSH_EVENT: &str = r#"{"type": "push", "buildID": "build-7", "revision": {"commit": "9c75584920f1297008118915024927a22f2e9292", "ref": "master"}}"#;

pub const IMAGE_PUSH_EVENT: &str = r#"{"type": "gcr_image_push", "buildID": "build-42", "payload": "{\"imageData\": {\"action\": \"INSERT\", \"tag\": \"gcr.io/example/api:v2\"}}"}"#;

pub const IMAGE_DELETE_EVENT: &str = r#"{"type": "gcr_image_push", "buildID": "build-43", "payload": "{\"imageData\": {\"action\": \"DELETE\", \"tag\": \"gcr.io/example/api:v1\"}}"}"#;

pub const DEPLOYMENT_YAML: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: gitops-hello-world
spec:
  replicas: 2
  template:
    spec:
      containers:
        - name: gitops-hello-world
          image: gcr.io/example/api:v1
"#;

//! Specs for `drydock patch`.

use crate::prelude::*;

#[test]
fn patch_prints_rewritten_manifest() {
    let ws = Workspace::new(true);
    let manifest = ws.write("deployment.yaml", DEPLOYMENT_YAML);

    let stdout = run_ok(ws.cmd().args([
        "patch",
        "--container",
        "gitops-hello-world",
        "--image",
        "gcr.io/example/api:v2",
        "--manifest",
    ]).arg(&manifest));

    assert!(stdout.contains("image: gcr.io/example/api:v2"), "got: {stdout}");
    assert!(!stdout.contains("gcr.io/example/api:v1"));
    assert!(stdout.contains("replicas: 2"));

    // Preview only: the file on disk is untouched
    let on_disk = std::fs::read_to_string(&manifest).unwrap();
    assert_eq!(on_disk, DEPLOYMENT_YAML);
}

#[test]
fn patch_write_rewrites_the_file_in_place() {
    let ws = Workspace::new(true);
    let manifest = ws.write("deployment.yaml", DEPLOYMENT_YAML);

    let stdout = run_ok(ws.cmd().args([
        "patch",
        "--container",
        "gitops-hello-world",
        "--image",
        "gcr.io/example/api:v2",
        "--write",
        "--manifest",
    ]).arg(&manifest));

    assert!(stdout.contains("patched"), "got: {stdout}");
    let on_disk = std::fs::read_to_string(&manifest).unwrap();
    assert!(on_disk.contains("image: gcr.io/example/api:v2"));
}

#[test]
fn patch_applied_twice_is_idempotent() {
    let ws = Workspace::new(true);
    let manifest = ws.write("deployment.yaml", DEPLOYMENT_YAML);
    let patch_args = [
        "patch",
        "--container",
        "gitops-hello-world",
        "--image",
        "gcr.io/example/api:v2",
        "--write",
        "--manifest",
    ];

    run_ok(ws.cmd().args(patch_args).arg(&manifest));
    let once = std::fs::read_to_string(&manifest).unwrap();

    run_ok(ws.cmd().args(patch_args).arg(&manifest));
    let twice = std::fs::read_to_string(&manifest).unwrap();

    assert_eq!(once, twice);
}

#[test]
fn patch_unknown_container_fails() {
    let ws = Workspace::new(true);
    let manifest = ws.write("deployment.yaml", DEPLOYMENT_YAML);

    let (_, stderr) = run_fail(ws.cmd().args([
        "patch",
        "--container",
        "nope",
        "--image",
        "img:v2",
        "--manifest",
    ]).arg(&manifest));

    assert!(stderr.contains("no container named nope"), "got: {stderr}");
}

#[test]
fn patch_missing_manifest_fails() {
    let ws = Workspace::new(true);

    let (_, stderr) = run_fail(ws.cmd().args([
        "patch",
        "--container",
        "c",
        "--image",
        "i",
        "--manifest",
        "does-not-exist.yaml",
    ]));

    assert!(stderr.contains("failed to read"), "got: {stderr}");
}

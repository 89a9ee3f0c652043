// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The standard GitOps deployment pipelines
//!
//! Task text is produced by stateless builder functions taking explicit
//! parameters; placeholder values (`${secret.*}`, `${event.*}`, ...)
//! are substituted by the engine at submission time. The two-phase
//! hand-off is encoded here: `gcr_image_push` commits a manifest change
//! to version control, and the resulting `push` event applies it.

use crate::def::{JobTemplate, PipelineDef, PipelineSet, RunPolicy, StageDef};
use crate::manifest::image_patch_yaml;
use dd_core::EventKind;
use indexmap::IndexMap;
use serde::Deserialize;

/// Attachment color for infra-update notifications
pub const INFRA_COLOR: &str = "#82aaff";
/// Attachment color for deploy notifications
pub const DEPLOY_COLOR: &str = "#c792ea";

fn default_hub_image() -> String {
    "gcr.io/hightowerlabs/hub".to_string()
}

fn default_kubectl_image() -> String {
    "gcr.io/cloud-builders/kubectl".to_string()
}

fn default_slack_image() -> String {
    "technosophos/slack-notify".to_string()
}

fn default_source_dir() -> String {
    "src".to_string()
}

fn default_manifest_dir() -> String {
    "kubernetes".to_string()
}

/// Configuration for the standard GitOps pipelines.
///
/// One struct replaces the three near-duplicate pipeline revisions;
/// the `notifications` flag is the single switch between the minimal
/// and the notification-rich variant.
#[derive(Debug, Clone, Deserialize)]
pub struct GitOpsConfig {
    /// Container name the manifest patch targets
    pub container_name: String,
    /// Commit author identity for manifest updates
    pub bot_email: String,
    pub bot_name: String,
    /// Directory the checkout lands in inside job containers
    #[serde(default = "default_source_dir")]
    pub source_dir: String,
    /// Directory holding the deployment manifests, relative to source_dir
    #[serde(default = "default_manifest_dir")]
    pub manifest_dir: String,
    #[serde(default = "default_hub_image")]
    pub hub_image: String,
    #[serde(default = "default_kubectl_image")]
    pub kubectl_image: String,
    #[serde(default = "default_slack_image")]
    pub slack_image: String,
    #[serde(default)]
    pub notifications: bool,
}

/// Write the git-hosting CLI credentials file.
///
/// Credentials are injected through a generated config file at job
/// start; they are never passed as CLI arguments.
pub fn hub_credentials(username: &str, token: &str) -> String {
    format!(
        r#"cat << EOF > $HOME/.config/hub
github.com:
  - protocol: https
    user: {username}
    oauth_token: {token}
EOF"#
    )
}

/// Configure the git-hosting CLI with the committer identity.
pub fn hub_config(email: &str, name: &str) -> String {
    format!(
        r#"hub config --global credential.https://github.com.helper /usr/local/bin/hub-credential-helper
hub config --global hub.protocol https
hub config --global user.email "{email}"
hub config --global user.name "{name}""#
    )
}

/// Patch the deployment manifest locally and commit the result.
///
/// The patch is applied with `kubectl patch --local` — no live cluster
/// mutation. The live apply happens in the separate deploy pipeline
/// triggered by the commit this task pushes.
pub fn commit_image(container: &str, image: &str, build_id: &str, manifest_dir: &str) -> String {
    let patch = image_patch_yaml(container, image);
    format!(
        r#"cat << EOF > patch.yaml
{patch}EOF

kubectl patch --local -o yaml \
  -f {manifest_dir}/deployment.yaml \
  -p "$(cat patch.yaml)" \
  > deployment.yaml

mv deployment.yaml {manifest_dir}/deployment.yaml

hub add {manifest_dir}/deployment.yaml

hub commit -F- << EOF
Update deployment container image

This commit updates the deployment container image to:
  {image}

Build ID:
  {build_id}
EOF"#
    )
}

/// Push the manifest commit back to the GitOps repository.
pub fn push_commit(clone_url: &str) -> String {
    format!(
        r#"hub remote add origin {clone_url}

hub push origin master"#
    )
}

/// Apply the manifest directory to the cluster.
pub fn kubectl_apply(manifest_dir: &str) -> String {
    format!("kubectl apply --recursive -f {manifest_dir}")
}

/// Print the checkout's HEAD commit SHA on stdout for output capture.
pub fn capture_head_sha() -> String {
    "git rev-parse HEAD".to_string()
}

/// Prefix a script with entering the checkout. Every task runs in a
/// fresh shell, so a change of directory only holds within one task.
fn in_checkout(source_dir: &str, script: &str) -> String {
    format!("cd {source_dir}\n{script}")
}

/// Environment for the chat-notification job.
///
/// The notification collaborator reads `{webhookURL, title, message,
/// colorToken}` from its environment; the message interpolates into a
/// fixed markup template upstream of this call.
pub fn slack_env(
    webhook: &str,
    title: &str,
    message: &str,
    color: &str,
) -> IndexMap<String, String> {
    IndexMap::from([
        ("SLACK_WEBHOOK".to_string(), webhook.to_string()),
        ("SLACK_TITLE".to_string(), title.to_string()),
        ("SLACK_MESSAGE".to_string(), message.to_string()),
        ("SLACK_COLOR".to_string(), color.to_string()),
    ])
}

fn slack_stage(name: &str, config: &GitOpsConfig, title: &str, message: &str, color: &str) -> StageDef {
    StageDef::job(
        JobTemplate::new(name, &config.slack_image)
            .task("/slack-notify")
            .envs(slack_env("${secret.SLACK_WEBHOOK}", title, message, color)),
    )
    .notify()
}

/// Build the standard pipeline set for one deployment.
pub fn standard_pipelines(config: &GitOpsConfig) -> PipelineSet {
    let mut set = PipelineSet::new(config.notifications);

    set.insert(EventKind::GcrImagePush, image_push_pipeline(config));
    set.insert(EventKind::Push, deploy_pipeline(config, true));
    set.insert(EventKind::Exec, deploy_pipeline(config, false));
    set.insert(EventKind::After, after_pipeline(config));

    set
}

/// `gcr_image_push`: commit the new image tag to the GitOps repo, then
/// notify with the resulting commit SHA.
fn image_push_pipeline(config: &GitOpsConfig) -> PipelineDef {
    let update = JobTemplate::new("update-infra-config", &config.hub_image)
        .task(hub_credentials(
            "${secret.GITHUB_USERNAME}",
            "${secret.GITHUB_TOKEN}",
        ))
        .task(hub_config(&config.bot_email, &config.bot_name))
        .task(in_checkout(
            &config.source_dir,
            &commit_image(
                &config.container_name,
                "${event.image}",
                "${event.build_id}",
                &config.manifest_dir,
            ),
        ))
        .task(in_checkout(
            &config.source_dir,
            &push_commit("${project.clone_url}"),
        ))
        .storage(true);

    // Reads the commit the update stage just made, via shared storage
    let capture = JobTemplate::new("capture-infra-commit", &config.hub_image)
        .task(in_checkout(&config.source_dir, &capture_head_sha()))
        .storage(true);

    let notify = slack_stage(
        "slack-notify-update-infra",
        config,
        "Infra Config Update",
        "Project <https://${project.name}|${project.name}>\n\
         Docker image <https://${event.image}|${event.image}>\n\
         Commit <https://${project.name}/commit/${output.capture-infra-commit}|${output.capture-infra-commit.short}>\n\
         Build <${secret.KASHTI_URL}/#!/build/${event.build_id}|${event.build_id}>",
        INFRA_COLOR,
    );

    PipelineDef::new(RunPolicy::Each)
        .stage(StageDef::job(update))
        .stage(StageDef::job(capture).needs("update-infra-config"))
        .stage(notify.needs("capture-infra-commit"))
}

/// `push` (and `exec`, without notifications): apply the committed
/// manifests to the staging cluster.
fn deploy_pipeline(config: &GitOpsConfig, with_notify: bool) -> PipelineDef {
    let deploy = JobTemplate::new("deploy-to-staging", &config.kubectl_image).task(in_checkout(
        &config.source_dir,
        &kubectl_apply(&config.manifest_dir),
    ));

    let mut def = PipelineDef::new(RunPolicy::Each).stage(StageDef::job(deploy));
    if with_notify {
        def = def.stage(slack_stage(
            "slack-notify-deploy-staging",
            config,
            "Deploy to Staging",
            "Project <https://${project.name}|${project.name}>\n\
             Commit <https://${project.name}/commit/${event.commit}|${event.short_commit}>\n\
             Build <${secret.KASHTI_URL}/#!/build/${event.build_id}|${event.build_id}>",
            DEPLOY_COLOR,
        ));
    }
    def
}

/// `after`: best-effort completion notification. Sent without
/// consulting the deploy outcome.
fn after_pipeline(config: &GitOpsConfig) -> PipelineDef {
    PipelineDef::new(RunPolicy::Each).stage(slack_stage(
        "slack-notify-after",
        config,
        "Build Finished",
        "Deployed to staging!\nBuild <${secret.KASHTI_URL}/#!/build/${event.build_id}|${event.build_id}>",
        DEPLOY_COLOR,
    ))
}

#[cfg(test)]
#[path = "gitops_tests.rs"]
mod tests;

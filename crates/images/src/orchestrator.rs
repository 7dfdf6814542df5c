//! Orchestrator - builds and pushes a list of targets, timing each step

use crate::docker::DockerClient;
use crate::targets::BuildTarget;
use serde::Serialize;
use shared::{Result, Timer};

/// Outcome of one build + push
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub repo: String,
    /// `None` in dry-run mode
    pub image_id: Option<String>,
    /// Tags pushed, branch tag first
    pub tags: Vec<String>,
    /// RFC 3339 start time
    pub started_at: String,
    pub build_seconds: f64,
    pub push_seconds: f64,
}

/// Runs the build/tag/push sequence for every target in order
pub struct Orchestrator<'a> {
    client: DockerClient<'a>,
    push: bool,
}

impl<'a> Orchestrator<'a> {
    pub fn new(client: DockerClient<'a>) -> Self {
        Self { client, push: true }
    }

    /// Skip pushing, only build and tag
    pub fn without_push(mut self) -> Self {
        self.push = false;
        self
    }

    /// Process targets in order, stopping at the first failure
    ///
    /// `on_done` is called after each finished target, e.g. to advance a
    /// progress bar.
    pub fn run(&self, targets: &[BuildTarget], mut on_done: impl FnMut(&BuildReport)) -> Result<Vec<BuildReport>> {
        let mut reports = Vec::with_capacity(targets.len());

        for target in targets {
            let _span = tracing::info_span!("image", repo = %target.repo).entered();
            let started_at = chrono::Utc::now().to_rfc3339();

            let build_timer = Timer::start(format!("docker build {}", target.commit_tag()));
            let image_id = self.client.build(target)?;
            let build_seconds = build_timer.stop();

            let (tags, push_seconds) = if self.push {
                let push_timer = Timer::start(format!(
                    "docker push {}:{}|{}",
                    target.repo, target.refname, target.commit
                ));
                let tags = self.client.push(target)?;
                (tags, push_timer.stop())
            } else {
                (Vec::new(), 0.0)
            };

            let report = BuildReport {
                repo: target.repo.clone(),
                image_id,
                tags,
                started_at,
                build_seconds,
                push_seconds,
            };
            on_done(&report);
            reports.push(report);
        }

        Ok(reports)
    }
}

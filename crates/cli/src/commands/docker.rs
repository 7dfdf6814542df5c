//! dune-ci docker command

use crate::context::{success, Context};
use clap::Args;
use images::{targets_for, DockerClient, GitRefs, Orchestrator};
use indicatif::{ProgressBar, ProgressStyle};
use shared::{CommandRunner, RecordingRunner, SystemRunner};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DockerCommand {
    /// Module whose testing images are built, or BASE for the shared base images
    pub module: String,

    /// Print the docker commands instead of running them
    #[arg(long)]
    pub dry_run: bool,

    /// Build and tag only
    #[arg(long)]
    pub no_push: bool,

    /// Repository queried for commit and remote when CI variables are unset
    #[arg(long, default_value = ".")]
    pub repo_dir: PathBuf,
}

impl DockerCommand {
    pub fn run(&self, ctx: &Context) -> anyhow::Result<()> {
        if self.dry_run {
            let recorder = RecordingRunner::new();
            self.run_with(ctx, &SystemRunner, &recorder)?;
            for line in recorder.command_lines() {
                println!("{}", line);
            }
            Ok(())
        } else {
            self.run_with(ctx, &SystemRunner, &SystemRunner)
        }
    }

    /// `git` queries go through `git_runner`, docker calls through `docker_runner`
    pub fn run_with(
        &self,
        ctx: &Context,
        git_runner: &dyn CommandRunner,
        docker_runner: &dyn CommandRunner,
    ) -> anyhow::Result<()> {
        let refs = GitRefs::resolve(git_runner, &ctx.env, &ctx.path(&self.repo_dir))?;
        let targets = targets_for(&ctx.config.docker, &self.module, &refs);
        if targets.is_empty() {
            anyhow::bail!("no image targets for module '{}'", self.module);
        }
        tracing::info!("{} image(s) for {} at {}", targets.len(), self.module, refs.refname);

        let client = DockerClient::new(docker_runner)
            .with_pull(ctx.config.docker.pull)
            .with_program(ctx.config.docker.program.as_str())
            .with_dry_run(self.dry_run);
        let mut orchestrator = Orchestrator::new(client);
        if self.no_push {
            orchestrator = orchestrator.without_push();
        }

        let progress = if ctx.json || self.dry_run {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(targets.len() as u64)
        };
        progress.set_style(ProgressStyle::with_template("{spinner} [{pos}/{len}] {msg}")?);

        let reports = orchestrator.run(&targets, |report| {
            progress.set_message(report.repo.clone());
            progress.inc(1);
        })?;
        progress.finish_and_clear();

        if ctx.json {
            ctx.print_json(&reports)?;
        } else if !self.dry_run {
            for report in &reports {
                success(format!(
                    "{} ({}) build {:.1}s push {:.1}s",
                    report.repo,
                    report.tags.join(", "),
                    report.build_seconds,
                    report.push_seconds
                ));
            }
        }
        Ok(())
    }
}

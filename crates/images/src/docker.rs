//! DockerClient - build, tag and push through the docker CLI

use crate::targets::BuildTarget;
use regex::Regex;
use shared::{run_checked, CommandFailedError, CommandRunner, CommandSpec, DuneCiError, Result};
use std::sync::OnceLock;

fn image_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)(?:^Successfully built |writing image sha256:|^sha256:)([0-9a-f]+)")
            .expect("image id pattern is valid")
    })
}

/// Extract the built image id from `docker build` output
///
/// Understands the classic builder (`Successfully built <id>`), BuildKit
/// (`writing image sha256:<id>`) and quiet mode (`sha256:<id>`). The last
/// occurrence wins.
pub fn parse_image_id(output: &str) -> Option<String> {
    image_id_re()
        .captures_iter(output)
        .last()
        .map(|caps| caps[1].to_string())
}

/// Thin wrapper over the docker CLI
pub struct DockerClient<'a> {
    runner: &'a dyn CommandRunner,
    program: String,
    pull: bool,
    dry_run: bool,
}

impl<'a> DockerClient<'a> {
    /// Create a client running `docker` through `runner`
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self {
            runner,
            program: "docker".to_string(),
            pull: true,
            dry_run: false,
        }
    }

    /// Always pull a newer version of the base image
    pub fn with_pull(mut self, pull: bool) -> Self {
        self.pull = pull;
        self
    }

    /// Do not require an image id in build output
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Use another docker-compatible CLI (e.g. `podman`)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// The `docker build` invocation for a target
    pub fn build_command(&self, target: &BuildTarget) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.program).arg("build");
        if self.pull {
            spec = spec.arg("--pull");
        }
        spec = spec.arg("--rm=false");
        for (key, value) in &target.build_args {
            spec = spec.arg("--build-arg").arg(format!("{}={}", key, value));
        }
        spec.arg("-t")
            .arg(target.commit_tag())
            .arg(target.context_dir.to_string_lossy())
    }

    /// Build `repo:commit` and tag it `repo:refname`; returns the image id
    pub fn build(&self, target: &BuildTarget) -> Result<Option<String>> {
        let spec = self.build_command(target);
        let output = self.runner.run(&spec)?;
        let combined = output.combined();

        if !output.success() {
            tracing::error!("{}", combined);
            tracing::error!("Failed: {}", spec);
            return Err(CommandFailedError {
                program: spec.program,
                args: spec.args,
                code: output.status,
                output: combined,
            }
            .into());
        }

        let image_id = parse_image_id(&combined);
        if image_id.is_none() && !self.dry_run {
            return Err(DuneCiError::Parse(format!(
                "docker build of {} reported no image id:\n{}",
                target.commit_tag(),
                combined
            )));
        }

        run_checked(
            self.runner,
            &CommandSpec::new(&self.program)
                .arg("tag")
                .arg(target.commit_tag())
                .arg(target.ref_tag()),
        )?;

        Ok(image_id)
    }

    /// Push `repo:refname`, then `repo:commit`
    pub fn push(&self, target: &BuildTarget) -> Result<Vec<String>> {
        let tags = vec![target.ref_tag(), target.commit_tag()];
        for tag in &tags {
            let spec = CommandSpec::new(&self.program).arg("push").arg(tag);
            if let Err(e) = run_checked(self.runner, &spec) {
                match &e {
                    DuneCiError::CommandFailed(failed) => {
                        tracing::error!("{}", failed.output);
                        tracing::error!("Failed: {}", failed.command_line());
                    }
                    _ => tracing::error!("Failed: {}", spec),
                }
                tracing::error!(
                    "Make sure the pushing account has write access to {} on the registry!",
                    target.repo
                );
                return Err(e);
            }
        }
        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{CommandOutput, RecordingRunner};
    use std::path::PathBuf;

    fn target() -> BuildTarget {
        BuildTarget {
            repo: "dunecommunity/dune-xt-testing_debian_gcc_full".to_string(),
            commit: "abc".to_string(),
            refname: "master".to_string(),
            context_dir: PathBuf::from(".ci/docker/individual_base"),
            build_args: vec![
                ("COMMIT".to_string(), "abc".to_string()),
                ("CC".to_string(), "gcc".to_string()),
            ],
        }
    }

    // ============== Image Id Parsing Tests ==============

    #[test]
    fn test_parse_image_id_classic_builder() {
        let out = "Step 1/3 : FROM debian\n ---> 1234\nSuccessfully built 0a1b2c3d4e5f\nSuccessfully tagged x:abc\n";
        assert_eq!(parse_image_id(out).as_deref(), Some("0a1b2c3d4e5f"));
    }

    #[test]
    fn test_parse_image_id_buildkit_ignores_base_digests() {
        let out = "#1 resolve docker.io/library/debian@sha256:ffff0000\n\
                   #9 writing image sha256:5e6f7a8b done\n\
                   #9 naming to docker.io/x:abc done\n";
        assert_eq!(parse_image_id(out).as_deref(), Some("5e6f7a8b"));
    }

    #[test]
    fn test_parse_image_id_quiet_and_missing() {
        assert_eq!(parse_image_id("sha256:abcdef\n").as_deref(), Some("abcdef"));
        assert_eq!(parse_image_id("Step 1/1 : FROM scratch\n"), None);
    }

    // ============== Client Tests ==============

    #[test]
    fn test_build_command_line() {
        let runner = RecordingRunner::new();
        let client = DockerClient::new(&runner);
        assert_eq!(
            client.build_command(&target()).to_string(),
            "docker build --pull --rm=false --build-arg COMMIT=abc --build-arg CC=gcc \
             -t dunecommunity/dune-xt-testing_debian_gcc_full:abc .ci/docker/individual_base"
        );

        let client = DockerClient::new(&runner).with_pull(false).with_program("podman");
        let line = client.build_command(&target()).to_string();
        assert!(line.starts_with("podman build --rm=false"));
    }

    #[test]
    fn test_build_tags_after_success() {
        let runner = RecordingRunner::with_responses([CommandOutput::ok("Successfully built 42abc\n")]);
        let id = DockerClient::new(&runner).build(&target()).unwrap();
        assert_eq!(id.as_deref(), Some("42abc"));

        let lines = runner.command_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "docker tag dunecommunity/dune-xt-testing_debian_gcc_full:abc dunecommunity/dune-xt-testing_debian_gcc_full:master"
        );
    }

    #[test]
    fn test_build_without_image_id_fails_unless_dry_run() {
        let runner = RecordingRunner::new();
        let err = DockerClient::new(&runner).build(&target()).unwrap_err();
        assert!(matches!(err, DuneCiError::Parse(_)));
        // no tag attempted
        assert_eq!(runner.calls().len(), 1);

        let runner = RecordingRunner::new();
        let id = DockerClient::new(&runner).with_dry_run(true).build(&target()).unwrap();
        assert_eq!(id, None);
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn test_build_failure_propagates_exit_code() {
        let runner = RecordingRunner::with_responses([CommandOutput::failed(1, "no such file: Dockerfile")]);
        let err = DockerClient::new(&runner).build(&target()).unwrap_err();
        assert_eq!(err.exit_code(), Some(1));
    }

    #[test]
    fn test_push_order_and_failure() {
        let runner = RecordingRunner::new();
        let tags = DockerClient::new(&runner).push(&target()).unwrap();
        assert_eq!(tags[0], "dunecommunity/dune-xt-testing_debian_gcc_full:master");
        assert_eq!(
            runner.command_lines(),
            vec![
                "docker push dunecommunity/dune-xt-testing_debian_gcc_full:master",
                "docker push dunecommunity/dune-xt-testing_debian_gcc_full:abc",
            ]
        );

        let runner = RecordingRunner::with_responses([CommandOutput::failed(1, "denied: requested access")]);
        assert!(DockerClient::new(&runner).push(&target()).is_err());
        assert_eq!(runner.calls().len(), 1);
    }
}

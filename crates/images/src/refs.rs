//! GitRefs - commit, ref name and super-repository URL used to tag images

use serde::Serialize;
use shared::{run_checked_trimmed, CommandRunner, CommandSpec, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Identity of the build being imaged
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitRefs {
    /// Full commit hash
    pub commit: String,
    /// Branch name with `/` replaced by `_`, usable as a docker tag
    pub refname: String,
    /// Clone URL of the super-repository
    pub superurl: String,
}

impl GitRefs {
    /// Resolve from CI variables, falling back to git in `repo_dir`
    pub fn resolve(runner: &dyn CommandRunner, env: &BTreeMap<String, String>, repo_dir: &Path) -> Result<Self> {
        let non_empty = |key: &str| env.get(key).filter(|v| !v.trim().is_empty()).map(|v| v.trim().to_string());

        let commit = match non_empty("CI_COMMIT_SHA") {
            Some(sha) => sha,
            None => run_checked_trimmed(
                runner,
                &CommandSpec::new("git").args(["rev-parse", "HEAD"]).current_dir(repo_dir),
            )?,
        };

        let refname = sanitize_refname(&non_empty("CI_COMMIT_REF_NAME").unwrap_or_else(|| "master".to_string()));

        let superurl = match non_empty("CI_REPOSITORY_URL") {
            Some(url) => url,
            None => run_checked_trimmed(
                runner,
                &CommandSpec::new("git")
                    .args(["remote", "get-url", "origin"])
                    .current_dir(repo_dir),
            )?,
        };

        tracing::debug!("resolved refs: commit={} refname={} superurl={}", commit, refname, superurl);

        Ok(Self {
            commit,
            refname,
            superurl,
        })
    }
}

/// Turn a branch name into a docker tag component
pub fn sanitize_refname(name: &str) -> String {
    name.replace('/', "_")
}

//! EnvFile - forwards selected CI variables into a docker `--env-file`

use serde::Serialize;
use shared::{EnvFileConfig, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Quote a string for a POSIX shell
///
/// Strings made only of safe characters are returned unchanged; anything
/// else is single-quoted with embedded quotes spliced as `'"'"'`.
pub fn shell_quote(s: &str) -> String {
    if s.is_empty() {
        return "''".to_string();
    }
    let safe = s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "_@%+=:,./-".contains(c));
    if safe {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', "'\"'\"'"))
}

/// Variables selected for forwarding
#[derive(Debug, Clone, Default, Serialize)]
pub struct EnvFile {
    pub vars: BTreeMap<String, String>,
}

impl EnvFile {
    /// Prefixes in effect: `ENV_PREFIXES` (space separated) or the configured list
    pub fn prefixes(env: &BTreeMap<String, String>, config: &EnvFileConfig) -> Vec<String> {
        match env.get("ENV_PREFIXES") {
            Some(value) => value
                .split(' ')
                .filter(|p| !p.is_empty())
                .map(|p| p.to_string())
                .collect(),
            None => config.prefixes.clone(),
        }
    }

    /// Select variables matching a prefix and not blacklisted
    pub fn collect(env: &BTreeMap<String, String>, config: &EnvFileConfig) -> Self {
        let prefixes = Self::prefixes(env, config);
        let vars = env
            .iter()
            .filter(|(key, _)| !config.blacklist.iter().any(|b| b == *key))
            .filter(|(key, _)| prefixes.iter().any(|p| key.starts_with(p.as_str())))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self { vars }
    }

    /// Output path: `DOCKER_ENVFILE`, else `$HOME/env`
    pub fn default_path(env: &BTreeMap<String, String>) -> PathBuf {
        if let Some(path) = env.get("DOCKER_ENVFILE") {
            return PathBuf::from(path);
        }
        let home = env.get("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
        home.join("env")
    }

    /// One `KEY="<quoted value>"` line per variable, sorted by key
    pub fn render(&self) -> String {
        self.vars
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"\n", k, shell_quote(v)))
            .collect()
    }

    /// Write the rendered file
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.render())?;
        tracing::info!("wrote {} variables to {}", self.vars.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    // ============== Quoting Tests ==============

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("debian_gcc-full/1.0:x"), "debian_gcc-full/1.0:x");
        assert_eq!(shell_quote("two words"), "'two words'");
        assert_eq!(shell_quote("it's"), "'it'\"'\"'s'");
        assert_eq!(shell_quote("$HOME"), "'$HOME'");
    }

    // ============== Selection Tests ==============

    #[test]
    fn test_collect_filters_by_prefix_and_blacklist() {
        let env = env(&[
            ("CI_COMMIT_SHA", "abc"),
            ("CI_COMMIT_MESSAGE", "fix: things"),
            ("GITLAB_USER", "someone"),
            ("TESTS_MODULE_SUBDIR", "xt/la"),
            ("PATH", "/usr/bin"),
            ("HOME", "/root"),
        ]);

        let file = EnvFile::collect(&env, &EnvFileConfig::default());
        let keys: Vec<&str> = file.vars.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["CI_COMMIT_SHA", "GITLAB_USER", "TESTS_MODULE_SUBDIR"]);
    }

    #[test]
    fn test_env_prefixes_override() {
        let env = env(&[("ENV_PREFIXES", "MY"), ("MY_VAR", "1"), ("CI_JOB_ID", "2")]);
        let file = EnvFile::collect(&env, &EnvFileConfig::default());
        assert_eq!(file.vars.len(), 1);
        assert!(file.vars.contains_key("MY_VAR"));
    }

    #[test]
    fn test_render_and_write() {
        let env = env(&[("CI_PROJECT_NAME", "dune-xt"), ("BUILD_FLAGS", "-O2 -g")]);
        let file = EnvFile::collect(&env, &EnvFileConfig::default());
        assert_eq!(
            file.render(),
            "BUILD_FLAGS=\"'-O2 -g'\"\nCI_PROJECT_NAME=\"dune-xt\"\n"
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("env");
        file.write(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), file.render());
    }

    #[test]
    fn test_default_path() {
        assert_eq!(
            EnvFile::default_path(&env(&[("DOCKER_ENVFILE", "/tmp/ci.env"), ("HOME", "/root")])),
            PathBuf::from("/tmp/ci.env")
        );
        assert_eq!(EnvFile::default_path(&env(&[("HOME", "/root")])), PathBuf::from("/root/env"));
    }
}

//! Configuration types for dune-ci
//!
//! Every section falls back to the historical dune-xt/dune-gdt CI constants,
//! so an empty (or absent) `dune-ci.yaml` reproduces the stock pipeline.

use crate::{DuneCiError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "dune-ci.yaml";

/// A C/C++ compiler pair
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Compiler {
    pub cc: String,
    pub cxx: String,
}

impl Compiler {
    pub fn new(cc: impl Into<String>, cxx: impl Into<String>) -> Self {
        Self {
            cc: cc.into(),
            cxx: cxx.into(),
        }
    }
}

/// Build matrix parameters for the CI config generator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatrixConfig {
    /// Project name substituted for `project_token` in the template text
    pub project: String,

    /// Literal token replaced before the template is parsed
    pub project_token: String,

    pub compilers: Vec<Compiler>,

    /// OS image names
    pub images: Vec<String>,

    /// Code subdirectories, one test job each
    pub subdirs: Vec<String>,

    /// Test kinds (`cpp`, `headercheck`, ...)
    pub kinds: Vec<String>,

    /// Python versions wheels are built for
    pub pythons: Vec<String>,

    /// Wheel build steps; the aggregate `all` step is appended automatically
    pub wheel_steps: Vec<String>,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            project: "dune-xt".to_string(),
            project_token: "DUNE_XT_OR_DUNE_GDT".to_string(),
            compilers: vec![Compiler::new("gcc", "g++"), Compiler::new("clang", "clang++")],
            images: vec!["debian".to_string()],
            subdirs: [
                "xt/common",
                "xt/grid",
                "xt/functions",
                "xt/functions1",
                "xt/functions2",
                "xt/la",
                "gdt",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            kinds: vec!["cpp".to_string(), "headercheck".to_string()],
            pythons: (7..10).map(|i| format!("3.{}", i)).collect(),
            wheel_steps: vec!["xt".to_string(), "gdt".to_string()],
        }
    }
}

/// Compiler and base distribution for one testing image tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSettings {
    pub cc: String,
    pub cxx: String,
    #[serde(default)]
    pub deletes: String,
    pub base: String,
}

/// Per-module docker build settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModuleSettings {
    /// Passed as the `modules_to_delete` build arg
    pub modules_to_delete: String,
}

/// Docker image orchestration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DockerConfig {
    /// Image tag -> compiler/base settings
    pub tag_matrix: BTreeMap<String, TagSettings>,

    /// Registry namespace images are pushed to
    pub namespace: String,

    /// Directory holding the `shared_base` and `individual_base` build contexts
    pub script_dir: PathBuf,

    pub modules: BTreeMap<String, ModuleSettings>,

    /// Always attempt to pull a newer base image
    pub pull: bool,

    /// docker-compatible CLI used for build/tag/push
    pub program: String,
}

impl Default for DockerConfig {
    fn default() -> Self {
        let mut tag_matrix = BTreeMap::new();
        tag_matrix.insert(
            "debian-unstable_gcc_full".to_string(),
            TagSettings {
                cc: "gcc".to_string(),
                cxx: "g++".to_string(),
                deletes: String::new(),
                base: "debian-unstable".to_string(),
            },
        );
        tag_matrix.insert(
            "debian_gcc_full".to_string(),
            TagSettings {
                cc: "gcc".to_string(),
                cxx: "g++".to_string(),
                deletes: String::new(),
                base: "debian".to_string(),
            },
        );
        tag_matrix.insert(
            "debian_clang_full".to_string(),
            TagSettings {
                cc: "clang".to_string(),
                cxx: "clang++".to_string(),
                deletes: String::new(),
                base: "debian".to_string(),
            },
        );

        Self {
            tag_matrix,
            namespace: "dunecommunity".to_string(),
            script_dir: PathBuf::from(".ci/docker"),
            modules: BTreeMap::new(),
            pull: true,
            program: "docker".to_string(),
        }
    }
}

/// Settings for the CI environment file handed to docker containers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnvFileConfig {
    /// Variable name prefixes to forward (overridden by `ENV_PREFIXES`)
    pub prefixes: Vec<String>,

    /// Variables never forwarded even when a prefix matches
    pub blacklist: Vec<String>,
}

impl Default for EnvFileConfig {
    fn default() -> Self {
        Self {
            prefixes: "BUILD SYSTEM GITLAB CODECOV CI encrypt TOKEN TESTS"
                .split(' ')
                .map(|s| s.to_string())
                .collect(),
            blacklist: vec![
                "TRAVIS_COMMIT_MESSAGE".to_string(),
                "CI_COMMIT_MESSAGE".to_string(),
                "CI_COMMIT_DESCRIPTION".to_string(),
            ],
        }
    }
}

/// Symlink checker settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinkcheckConfig {
    /// Glob patterns (relative to the scan root) that are not descended into
    pub exclude: Vec<String>,
}

/// Top-level `dune-ci.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolConfig {
    pub matrix: MatrixConfig,
    pub docker: DockerConfig,
    pub env_file: EnvFileConfig,
    pub linkcheck: LinkcheckConfig,
}

impl ToolConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML text; an empty document yields defaults
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Resolve the configuration: explicit path, then `dune-ci.yaml` in `cwd`,
    /// then built-in defaults
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(DuneCiError::Config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            tracing::debug!("loading config from {}", path.display());
            return Self::from_file(path);
        }

        let candidate = cwd.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!("loading config from {}", candidate.display());
            return Self::from_file(&candidate);
        }

        tracing::debug!("no config file found, using defaults");
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_pipeline() {
        let config = ToolConfig::default();
        assert_eq!(config.matrix.compilers.len(), 2);
        assert_eq!(config.matrix.subdirs.len(), 7);
        assert_eq!(config.matrix.pythons, vec!["3.7", "3.8", "3.9"]);
        assert_eq!(config.docker.tag_matrix.len(), 3);
        assert_eq!(config.docker.tag_matrix["debian_clang_full"].cxx, "clang++");
        assert_eq!(config.docker.program, "docker");
        assert_eq!(config.env_file.prefixes.len(), 8);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
matrix:
  project: dune-gdt
  images: [debian, debian-unstable]
docker:
  namespace: example
  modules:
    dune-gdt:
      modulesToDelete: "dune-xt-data"
"#;

        let config = ToolConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.matrix.project, "dune-gdt");
        assert_eq!(config.matrix.images.len(), 2);
        assert_eq!(config.matrix.kinds, vec!["cpp", "headercheck"]);
        assert_eq!(config.docker.namespace, "example");
        assert_eq!(config.docker.modules["dune-gdt"].modules_to_delete, "dune-xt-data");
        assert!(config.docker.pull);
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = ToolConfig::from_yaml_str("  \n").unwrap();
        assert_eq!(config.docker.namespace, "dunecommunity");
    }

    #[test]
    fn test_discover_lookup_order() {
        let dir = tempfile::tempdir().unwrap();

        let config = ToolConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config.matrix.project, "dune-xt");

        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "matrix:\n  project: found\n").unwrap();
        let config = ToolConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config.matrix.project, "found");

        let explicit = dir.path().join("other.yaml");
        std::fs::write(&explicit, "matrix:\n  project: explicit\n").unwrap();
        let config = ToolConfig::discover(Some(&explicit), dir.path()).unwrap();
        assert_eq!(config.matrix.project, "explicit");

        let missing = dir.path().join("missing.yaml");
        assert!(ToolConfig::discover(Some(&missing), dir.path()).is_err());
    }
}

//! State shared by every subcommand

use serde::Serialize;
use shared::{current_env, DuneCiError, ToolConfig};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Loaded configuration, environment snapshot and output mode
#[derive(Debug, Clone)]
pub struct Context {
    pub config: ToolConfig,
    pub env: BTreeMap<String, String>,
    pub cwd: PathBuf,
    /// Print machine-readable reports on stdout
    pub json: bool,
}

impl Context {
    /// Discover the config from `--config` or the working directory
    pub fn load(config_path: Option<&Path>, json: bool) -> anyhow::Result<Self> {
        let cwd = std::env::current_dir()?;
        let config = ToolConfig::discover(config_path, &cwd)?;
        Ok(Self {
            config,
            env: current_env(),
            cwd,
            json,
        })
    }

    /// Context over explicit values, without touching the process state
    pub fn new(config: ToolConfig, env: BTreeMap<String, String>, cwd: impl Into<PathBuf>, json: bool) -> Self {
        Self {
            config,
            env,
            cwd: cwd.into(),
            json,
        }
    }

    /// Resolve `path` against the working directory
    pub fn path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    pub fn print_json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// Green check mark line
pub fn success(message: impl std::fmt::Display) {
    println!("{} {}", console::style("✓").green(), message);
}

/// Red cross line on stderr
pub fn failure(message: impl std::fmt::Display) {
    eprintln!("{} {}", console::style("✗").red(), message);
}

/// Process exit code for a failed command: a failing subprocess's own code, else 1
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<DuneCiError>()
        .and_then(DuneCiError::exit_code)
        .filter(|code| *code != 0)
        .unwrap_or(1)
}

//! dune-ci env-file command

use crate::context::{success, Context};
use clap::Args;
use images::EnvFile;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct EnvFileCommand {
    /// Target file; defaults to $DOCKER_ENVFILE, else $HOME/env
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl EnvFileCommand {
    pub fn run(&self, ctx: &Context) -> anyhow::Result<()> {
        let file = EnvFile::collect(&ctx.env, &ctx.config.env_file);
        let path = match &self.output {
            Some(path) => ctx.path(path),
            None => EnvFile::default_path(&ctx.env),
        };
        file.write(&path)?;

        if ctx.json {
            ctx.print_json(&serde_json::json!({
                "path": path,
                "variables": file.vars.keys().collect::<Vec<_>>(),
            }))?;
        } else {
            success(format!("{} variables written to {}", file.vars.len(), path.display()));
        }
        Ok(())
    }
}

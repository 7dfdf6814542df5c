//! dune-ci provenance command

use crate::context::{success, Context};
use clap::{Args, Subcommand};
use provenance::{SuperRecord, GITSUPER_FILE};
use shared::{CommandRunner, SystemRunner};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ProvenanceCommand {
    #[command(subcommand)]
    pub command: ProvenanceSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum ProvenanceSubcommand {
    /// Record the super-repository state into .gitsuper
    Record {
        /// Super-repository checkout
        #[arg(long, default_value = "..")]
        super_dir: PathBuf,
        /// Output file
        #[arg(short, long, default_value = GITSUPER_FILE)]
        output: PathBuf,
    },
    /// Show a recorded .gitsuper file
    Show {
        #[arg(short, long, default_value = GITSUPER_FILE)]
        file: PathBuf,
    },
}

impl ProvenanceCommand {
    pub fn run(&self, ctx: &Context) -> anyhow::Result<()> {
        self.run_with(ctx, &SystemRunner)
    }

    pub fn run_with(&self, ctx: &Context, runner: &dyn CommandRunner) -> anyhow::Result<()> {
        match &self.command {
            ProvenanceSubcommand::Record { super_dir, output } => {
                let record = SuperRecord::capture(runner, &ctx.path(super_dir))?;
                let path = ctx.path(output);
                record.write(&path)?;
                if ctx.json {
                    ctx.print_json(&record)?;
                } else {
                    success(format!("recorded {} at {} in {}", record.remote, record.commit, path.display()));
                }
            }
            ProvenanceSubcommand::Show { file } => {
                let record = SuperRecord::read(&ctx.path(file))?;
                let submodules = record.submodules()?;
                if ctx.json {
                    ctx.print_json(&serde_json::json!({
                        "remote": record.remote,
                        "commit": record.commit,
                        "submodules": submodules,
                    }))?;
                } else {
                    println!("{} {}", console::style(&record.remote).bold(), record.commit);
                    for sub in &submodules {
                        println!(
                            "  {} {} {} {}",
                            sub.state.marker(),
                            sub.sha,
                            sub.path,
                            sub.describe.as_deref().unwrap_or("")
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

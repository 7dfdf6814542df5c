//! dune-ci check-symlinks command

use crate::context::{failure, success, Context};
use clap::Args;
use linkcheck::{scan, ScanOptions};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct CheckSymlinksCommand {
    /// Directory to scan
    #[arg(default_value = ".")]
    pub root: PathBuf,
}

impl CheckSymlinksCommand {
    /// Returns the process exit code: 0 when clean, 1 otherwise
    pub fn run(&self, ctx: &Context) -> anyhow::Result<i32> {
        let options = ScanOptions::from_config(&ctx.config.linkcheck)?;
        let report = scan(&ctx.path(&self.root), &options)?;

        if ctx.json {
            ctx.print_json(&report)?;
        } else if report.is_clean() {
            success(format!("{} symlinks checked, none broken", report.checked));
        } else {
            failure(report.render());
        }

        Ok(if report.is_clean() { 0 } else { 1 })
    }
}

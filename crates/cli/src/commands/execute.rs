//! dune-ci execute command

use crate::context::{failure, Context};
use clap::Args;
use shared::{CommandRunner, SystemRunner};
use std::path::PathBuf;
use testexec::TestInvocation;

#[derive(Debug, Args)]
pub struct ExecuteCommand {
    /// Test executable in the current directory
    #[arg(long)]
    pub exec: String,

    /// Parameter file handed to the executable
    #[arg(long)]
    pub ini: Option<PathBuf>,

    /// Extra arguments passed through
    #[arg(last = true)]
    pub extra: Vec<String>,
}

impl ExecuteCommand {
    /// Returns the test's exit code
    pub fn run(&self, ctx: &Context) -> anyhow::Result<i32> {
        self.run_with(ctx, &SystemRunner)
    }

    pub fn run_with(&self, ctx: &Context, runner: &dyn CommandRunner) -> anyhow::Result<i32> {
        let ini = self.ini.as_ref().map(|p| ctx.path(p));
        let invocation = TestInvocation::build(&self.exec, ini.as_deref(), &self.extra)?;
        let outcome = invocation.run(runner)?;

        if ctx.json {
            ctx.print_json(&serde_json::json!({
                "invocation": invocation,
                "outcome": outcome,
            }))?;
        } else if outcome.exit_code != 0 {
            failure(format!("{} exited with {}", invocation.program, outcome.exit_code));
        }
        Ok(outcome.exit_code)
    }
}

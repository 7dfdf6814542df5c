//! dune-ci depgraph command

use crate::context::{failure, success, Context};
use clap::Args;
use depgraph::{capture, guess_root, write_cycles, write_dot, IncludeTree, ParseOptions, DEFAULT_MAX_DEPTH, RENDER_MAX_DEPTH};
use shared::{CommandRunner, SystemRunner};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DepgraphCommand {
    /// Prefix stripped from header paths
    #[arg(long, default_value = "")]
    pub strip_base: String,

    /// File receiving the compiler output; .cycles and .dot land next to it
    #[arg(short, long)]
    pub output: PathBuf,

    /// Deepest include level considered for cycle detection
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Name of the translation unit; guessed from the compiler arguments
    #[arg(long)]
    pub root: Option<String>,

    /// Compiler invocation, including -H
    #[arg(last = true, required = true)]
    pub compiler: Vec<String>,
}

impl DepgraphCommand {
    /// Returns the compiler's exit code, 0 on success
    pub fn run(&self, ctx: &Context) -> anyhow::Result<i32> {
        self.run_with(ctx, &SystemRunner)
    }

    pub fn run_with(&self, ctx: &Context, runner: &dyn CommandRunner) -> anyhow::Result<i32> {
        let out_file = ctx.path(&self.output);
        let status = capture(runner, &self.compiler, &out_file)?;
        if status != 0 {
            failure(format!("compiler exited with {}, see {}", status, out_file.display()));
            return Ok(status);
        }

        let text = std::fs::read_to_string(&out_file)?;
        let options = ParseOptions {
            strip_base: self.strip_base.clone(),
            max_depth: self.max_depth,
            root: self.root.clone().unwrap_or_else(|| guess_root(&self.compiler)),
        };

        let tree = IncludeTree::parse(&text, &options);
        let cycles_file = write_cycles(&tree.graph, &out_file)?;

        let shallow = IncludeTree::parse(&text, &options.with_max_depth(RENDER_MAX_DEPTH));
        let dot_file = write_dot(&shallow.graph, &out_file)?;

        if ctx.json {
            ctx.print_json(&serde_json::json!({
                "root": options.root,
                "nodes": tree.graph.node_count(),
                "edges": tree.graph.edge_count(),
                "cycles": cycles_file,
                "dot": dot_file,
            }))?;
        } else {
            match &cycles_file {
                Some(path) => failure(format!("include cycles found, see {}", path.display())),
                None => success(format!("{} headers, no include cycles", tree.graph.node_count() - 1)),
            }
        }
        Ok(0)
    }
}

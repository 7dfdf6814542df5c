//! dune-ci - CI and build helpers for the dune-xt / dune-gdt modules
//!
//! Usage:
//!   dune-ci ci-config --template <file>        - Render the CI pipeline
//!   dune-ci docker <MODULE|BASE> [--dry-run]    - Build and push testing images
//!   dune-ci env-file                           - Write the docker env file
//!   dune-ci provenance record|show             - Record the super-repository state
//!   dune-ci check-symlinks [root]              - Report broken symlinks
//!   dune-ci depgraph --output <f> -- <cc ...>  - Include graph and cycle report
//!   dune-ci execute --exec <name> [--ini <f>]  - Run a test executable

use clap::{Parser, Subcommand};
use cli::commands::{
    CheckSymlinksCommand, CiConfigCommand, DepgraphCommand, DockerCommand, EnvFileCommand, ExecuteCommand,
    ProvenanceCommand,
};
use cli::context::{exit_code, Context};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dune-ci")]
#[command(about = "CI and build helpers for dune modules")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Tool configuration (defaults to ./dune-ci.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output reports as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the CI pipeline from a template and the build matrix
    CiConfig(CiConfigCommand),
    /// Build and push docker images
    Docker(DockerCommand),
    /// Write CI variables into a docker env file
    EnvFile(EnvFileCommand),
    /// Record or show the super-repository state (.gitsuper)
    Provenance(ProvenanceCommand),
    /// Report broken symlinks
    CheckSymlinks(CheckSymlinksCommand),
    /// Capture a compiler include trace and report include cycles
    Depgraph(DepgraphCommand),
    /// Run a test executable with its ini file
    Execute(ExecuteCommand),
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let ctx = Context::load(cli.config.as_deref(), cli.json)?;

    let code = match cli.command {
        Commands::CiConfig(cmd) => cmd.run(&ctx).map(|_| 0)?,
        Commands::Docker(cmd) => cmd.run(&ctx).map(|_| 0)?,
        Commands::EnvFile(cmd) => cmd.run(&ctx).map(|_| 0)?,
        Commands::Provenance(cmd) => cmd.run(&ctx).map(|_| 0)?,
        Commands::CheckSymlinks(cmd) => cmd.run(&ctx)?,
        Commands::Depgraph(cmd) => cmd.run(&ctx)?,
        Commands::Execute(cmd) => cmd.run(&ctx)?,
    };
    Ok(code)
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:?}", e);
            std::process::exit(exit_code(&e));
        }
    }
}

//! CLI Commands

pub mod check_symlinks;
pub mod ci_config;
pub mod depgraph;
pub mod docker;
pub mod env_file;
pub mod execute;
pub mod provenance;

pub use check_symlinks::CheckSymlinksCommand;
pub use ci_config::CiConfigCommand;
pub use depgraph::DepgraphCommand;
pub use docker::DockerCommand;
pub use env_file::EnvFileCommand;
pub use execute::ExecuteCommand;
pub use provenance::ProvenanceCommand;

//! # dune-ci images
//!
//! Builds and pushes the docker images CI jobs run in.
//!
//! ## Components
//!
//! - `GitRefs` - commit / ref name / super-repository URL of the build
//! - `targets` - tag matrix -> `BuildTarget`s (shared base or per-module images)
//! - `DockerClient` - `docker build`, `tag` and `push` through a `CommandRunner`
//! - `Orchestrator` - timed build + push over a list of targets
//! - `EnvFile` - CI variables forwarded into containers

pub mod docker;
pub mod envfile;
pub mod orchestrator;
pub mod refs;
pub mod targets;

pub use docker::{parse_image_id, DockerClient};
pub use envfile::{shell_quote, EnvFile};
pub use orchestrator::{BuildReport, Orchestrator};
pub use refs::GitRefs;
pub use targets::{base_targets, module_targets, targets_for, BuildTarget, BASE_MODULE};

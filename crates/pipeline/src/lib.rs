//! # dune-ci pipeline
//!
//! Renders the CI pipeline definition from a YAML template and a build
//! matrix (compilers x OS images x code subdirectories x test kinds).
//!
//! ## Components
//!
//! - `BuildMatrix` - cartesian product of the matrix parameters
//! - `template` - `{{ placeholder | filter }}` substitution over YAML trees
//! - `PipelineTemplate` / `render_pipeline` - assembles the final document

pub mod generator;
pub mod matrix;
pub mod template;

pub use generator::{generate, render_pipeline, GenerateSummary, JobTemplate, PipelineTemplate};
pub use matrix::{BuildMatrix, MatrixEntry, WheelEntry};
pub use template::{render_str, render_value};

//! # dune-ci shared
//!
//! Common types and plumbing used across all dune-ci crates.
//!
//! ## Components
//!
//! - `error` - `DuneCiError` and the crate-wide `Result`
//! - `config` - YAML tool configuration with built-in defaults
//! - `ini` - ConfigParser-style INI reader/writer
//! - `process` - `CommandRunner` seam over `std::process::Command`
//! - `timer` - timed sections logged through `tracing`

pub mod config;
pub mod error;
pub mod ini;
pub mod process;
pub mod timer;

// Re-exports
pub use config::*;
pub use error::*;
pub use ini::Ini;
pub use process::*;
pub use timer::Timer;

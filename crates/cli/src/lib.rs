//! dune-ci command line: one subcommand per helper crate

pub mod commands;
pub mod context;

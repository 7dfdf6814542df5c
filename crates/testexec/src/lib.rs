//! # dune-ci testexec
//!
//! Runs a dune test executable the way ctest would: with its parameter file
//! and a gtest XML report named after the executable and the ini file.

pub mod invocation;

pub use invocation::{TestInvocation, TestOutcome, INIFILE_OPTION_KEY};

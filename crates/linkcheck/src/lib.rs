//! # dune-ci linkcheck
//!
//! Walks a checkout and reports symbolic links whose target is missing.

pub mod scanner;

pub use scanner::{scan, BrokenLink, Report, ScanOptions};

//! # dune-ci depgraph
//!
//! Turns a compiler's `-H` include trace into a directed graph, enumerates
//! include cycles and renders the graph for Graphviz.
//!
//! ## Components
//!
//! - `IncludeGraph` - deduplicated digraph with simple-cycle enumeration
//! - `IncludeTree` - parser for `-H` style `<dots> <path>` lines
//! - `capture` - runs the compiler and writes the side-car report files

pub mod capture;
pub mod graph;
pub mod tree;

pub use capture::{capture, guess_root, side_car_path, write_cycles, write_dot};
pub use graph::{format_cycle, IncludeGraph};
pub use tree::{IncludeTree, ParseOptions, DEFAULT_MAX_DEPTH, RENDER_MAX_DEPTH};

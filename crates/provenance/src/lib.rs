//! # dune-ci provenance
//!
//! Records which super-repository (remote, submodule status, commit) a
//! checkout was committed from, in a `.gitsuper` INI file.

pub mod record;
pub mod submodule;

pub use record::{SuperRecord, GITSUPER_FILE, SECTION};
pub use submodule::{SubmoduleState, SubmoduleStatus};

//! genschema: JSON Schema fragments from Go struct declarations.
//!
//! The binary scans directories of Go sources, builds a type registry per
//! package and prints one schema fragment per struct. The heavy lifting
//! lives in [`genschema_core`]; this crate adds discovery, configuration
//! and output.

pub mod config;
pub mod run;
pub mod scan;

pub use config::GenschemaConfig;
pub use run::{Report, RunOptions, ScopeFailure, run};
pub use scan::{ScanError, ScanOptions, Scope};

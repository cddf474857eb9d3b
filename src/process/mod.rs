//! Process execution.
//!
//! This module holds the runners that spawn external tool binaries on behalf
//! of the command builders.

pub mod runner;

// Re-export commonly used items for convenience
pub use runner::{ProcessRunner, RunError, SystemRunner};

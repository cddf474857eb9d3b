//! Command builders.
//!
//! This module holds the generic option store and builder, plus the
//! configtxgen-specific builder used for network artifact generation.

pub mod builder;
pub mod configtxgen;
pub mod options;

pub use builder::{CommandBuilder, FailureHandler, FailurePolicy};
pub use configtxgen::ConfigTxGen;
pub use options::{options_to_args, OptionStore, OptionValue};

//! Shared utilities: tool binary table and path resolution.

pub mod binary;

pub use binary::{resolve_binary_path, validate_binary, Binary, BinaryError};

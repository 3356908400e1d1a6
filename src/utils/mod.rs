//! Shared utilities: executable resolution, duration parsing.

pub mod binary;
pub mod duration;

pub use binary::{is_explicit_path, resolve_executable, validate_executable, BinaryError};
pub use duration::parse_duration;

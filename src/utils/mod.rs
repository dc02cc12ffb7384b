//! Shared utilities: interval parsing.

pub mod duration;

pub use duration::parse_interval_seconds;

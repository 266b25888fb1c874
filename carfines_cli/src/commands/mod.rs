//! CLI command implementations.

pub mod notify;

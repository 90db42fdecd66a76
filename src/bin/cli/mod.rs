//! CLI Module Organization
//!
//! - args: CLI argument structures
//! - commands: command execution
//! - config_layer: merging of file configuration and CLI overrides

pub mod args;
pub mod commands;
pub mod config_layer;

// Re-export commonly used items for convenience
pub use args::*;
pub use commands::*;

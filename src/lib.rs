//! # envinline: Build-Time Environment Variable Inlining
//!
//! Rewrites `process.env.NAME` and `process.env["NAME"]` reads in serverless
//! function sources into string literals holding the value the variable had
//! at build time.
//!
//! - **Discovery**: host function registry, optionally merged with a recursive
//!   scan of the functions directory
//! - **Policy**: include/exclude lists decide which names are eligible
//! - **Rewrite**: tree-sitter parsing of JavaScript, TypeScript and TSX, with
//!   edits spliced into the original text so formatting and line numbers survive
//! - **Report**: one summary or one failure per run, delivered to the host
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Pipeline (core::pipeline)               │
//! ├──────────────────────────────────────────────────────────┤
//! │  Discovery      │  Transform        │  Host seams        │
//! │ • Registry      │ • env_refs        │ • FunctionRegistry │
//! │ • Path scan     │ • TreeSitter      │ • BuildReporter    │
//! │ • De-dup        │ • Policy / Env    │ • Config (YAML)    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use envinline::core::pipeline::{ConsoleReporter, DirectoryRegistry, InlinePipeline};
//! use envinline::InlinerConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = InlinerConfig {
//!         functions_src: Some("netlify/functions".into()),
//!         ..InlinerConfig::default()
//!     };
//!     let registry = DirectoryRegistry::shared("netlify/functions");
//!     let pipeline = InlinePipeline::new(config, registry, Arc::new(ConsoleReporter::new()));
//!
//!     let outcome = pipeline.run().await;
//!     println!("success: {}", outcome.is_success());
//! }
//! ```

#![warn(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// Configuration, errors and the discovery/rewrite pipeline
pub mod core {
    //! Configuration, inline policy and the discovery/rewrite pipeline.

    pub mod config;
    pub mod environment;
    pub mod errors;
    pub mod pipeline;
    pub mod policy;
}

// Language support
pub mod lang {
    //! Tree-sitter language table, reference finder and source transform.

    pub mod env_refs;
    pub mod registry;
    pub mod transform;
}

// Re-export primary types for convenience
pub use core::config::{AbsentVariables, BuildEvent, InlinerConfig, NameListInput};
pub use core::environment::EnvSnapshot;
pub use core::errors::{InlineError, Result};
pub use core::pipeline::{InlinePipeline, RunOutcome};
pub use core::policy::InlinePolicy;
pub use lang::transform::{SourceTransform, TreeSitterTransform};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

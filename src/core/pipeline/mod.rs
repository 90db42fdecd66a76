//! Discovery and rewrite pipeline.
//!
//! ## Stages
//!
//! 1. **Discovery**: merge the host registry with an optional recursive scan
//! 2. **Transform**: rewrite every discovered file concurrently
//! 3. **Report**: one summary or one failure back to the host
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use envinline::core::pipeline::{ConsoleReporter, DirectoryRegistry, InlinePipeline};
//!
//! let pipeline = InlinePipeline::new(
//!     config,
//!     DirectoryRegistry::shared("netlify/functions"),
//!     Arc::new(ConsoleReporter::new()),
//! );
//! let outcome = pipeline.run().await;
//! ```

use std::sync::Arc;

use crate::core::config::InlinerConfig;

pub use descriptor::{is_source_function, to_source_file, FunctionDescriptor, RawDescriptor};
pub use file_discovery::{discover, DiscoveryOptions, REGISTRY_FAILURE_MESSAGE};
pub use inliner::inline_file;
pub use path_collector::collect_paths;
pub use pipeline_executor::{
    run_with_config, InlinePipeline, PipelineState, RunOutcome, SKIPPED_SUMMARY,
};
pub use services::{
    BuildReporter, ConsoleReporter, DirectoryRegistry, FunctionRegistry, ManifestRegistry,
    RecordingReporter, ReportEvent, StaticRegistry, UnconfiguredRegistry,
};

mod descriptor;
mod file_discovery;
mod inliner;
mod path_collector;
mod pipeline_executor;
mod services;

/// Build the host registry described by `config`.
///
/// A manifest takes precedence over listing `functions_src`. Without either,
/// the registry fails on enumeration and the run reports it through the host.
pub fn registry_from_config(config: &InlinerConfig) -> Arc<dyn FunctionRegistry> {
    if let Some(manifest) = &config.manifest {
        return Arc::new(ManifestRegistry::new(manifest));
    }
    match &config.functions_src {
        Some(functions_src) => DirectoryRegistry::shared(functions_src),
        None => Arc::new(UnconfiguredRegistry),
    }
}

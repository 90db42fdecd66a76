//! Discovery of the source files to rewrite.
//!
//! The registry's descriptors come first, followed (when `inline_all` is set)
//! by every file under the functions directory. The merged list is filtered to
//! rewritable source kinds and de-duplicated by resolved path, keeping the
//! first occurrence.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use tracing::{debug, info};

use super::descriptor::{is_source_function, to_source_file, RawDescriptor};
use super::path_collector::collect_paths;
use super::services::FunctionRegistry;
use crate::core::errors::{InlineError, Result};

/// Message reported when the host registry cannot be enumerated.
pub const REGISTRY_FAILURE_MESSAGE: &str = "Failed to inline function files because the function folder was not configured or pointed to a wrong folder, please check your configuration";

/// Options controlling discovery.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Also scan `functions_src` recursively
    pub inline_all: bool,
    /// Root of the recursive scan
    pub functions_src: Option<PathBuf>,
}

/// Produce the ordered, de-duplicated list of files to rewrite.
///
/// A registry failure is fatal and is reported as a discovery error; it never
/// degrades to an empty file set.
pub async fn discover(
    registry: &dyn FunctionRegistry,
    options: &DiscoveryOptions,
) -> Result<Vec<PathBuf>> {
    let mut descriptors = registry
        .list_all()
        .await
        .map_err(|e| InlineError::discovery_caused_by(REGISTRY_FAILURE_MESSAGE, e))?;
    debug!("Function registry returned {} entries", descriptors.len());

    if options.inline_all {
        let root = options.functions_src.as_deref().ok_or_else(|| {
            InlineError::config_field("inline_all requires functions_src", "functions_src")
        })?;
        debug!("Loading additional files from {}", root.display());

        let additional = collect_paths(root)
            .await
            .map_err(|e| InlineError::discovery_caused_by(REGISTRY_FAILURE_MESSAGE, e))?;
        debug!("Found {:?}", additional);

        descriptors.extend(
            additional
                .into_iter()
                .map(|path| RawDescriptor::Scanned(absolute(&path))),
        );
    }

    let mut unique = IndexSet::new();
    for descriptor in descriptors.into_iter().filter_map(RawDescriptor::normalize) {
        if !is_source_function(&descriptor) {
            continue;
        }
        unique.insert(resolve(to_source_file(&descriptor)).await);
    }

    let files: Vec<PathBuf> = unique.into_iter().collect();
    info!("File discovery completed: {} function files selected", files.len());
    Ok(files)
}

/// Absolute form of `path` without touching the filesystem.
fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Canonical path used as the de-duplication identity.
async fn resolve(path: &Path) -> PathBuf {
    match tokio::fs::canonicalize(path).await {
        Ok(canonical) => canonical,
        Err(_) => absolute(path),
    }
}

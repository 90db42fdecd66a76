//! Function descriptors and their normalization.
//!
//! Descriptors reach the pipeline from two places: the host's function
//! registry and the optional recursive scan of the functions directory. Both
//! are normalized into one [`FunctionDescriptor`] shape before filtering.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::lang::registry::extension_is_supported;

/// Normalized record identifying one deployable source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDescriptor {
    /// Runtime reported for the function (e.g. `js`)
    pub runtime: String,
    /// File extension including the leading dot (e.g. `.ts`)
    pub extension: String,
    /// Absolute path of the function's main source file
    pub src_file: PathBuf,
}

impl FunctionDescriptor {
    /// Synthesize a descriptor for a file found by the recursive scan.
    ///
    /// The extension comes from the path and the runtime is the extension
    /// without its leading dot.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let runtime = extension.trim_start_matches('.').to_string();

        Self {
            runtime,
            extension,
            src_file: path.to_path_buf(),
        }
    }
}

/// Descriptor as handed over by one of the discovery sources.
///
/// Registry entries may be incomplete; they stay representable here so a
/// single bad entry is filtered out instead of failing discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawDescriptor {
    /// Entry reported by the host function registry
    Registry {
        runtime: Option<String>,
        extension: Option<String>,
        src_file: Option<PathBuf>,
    },
    /// File found by the recursive scan
    Scanned(PathBuf),
}

impl RawDescriptor {
    pub fn from_registry(descriptor: FunctionDescriptor) -> Self {
        Self::Registry {
            runtime: Some(descriptor.runtime),
            extension: Some(descriptor.extension),
            src_file: Some(descriptor.src_file),
        }
    }

    /// Normalize into a [`FunctionDescriptor`]; `None` when malformed.
    pub fn normalize(self) -> Option<FunctionDescriptor> {
        match self {
            Self::Registry {
                runtime,
                extension,
                src_file,
            } => {
                let src_file = src_file.filter(|p| !p.as_os_str().is_empty())?;
                let extension = extension.filter(|e| !e.is_empty())?;
                let runtime =
                    runtime.unwrap_or_else(|| extension.trim_start_matches('.').to_string());
                Some(FunctionDescriptor {
                    runtime,
                    extension,
                    src_file,
                })
            }
            Self::Scanned(path) => Some(FunctionDescriptor::from_path(&path)),
        }
    }
}

/// Host manifest entry shape; every field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ManifestEntry {
    pub runtime: Option<String>,
    pub extension: Option<String>,
    pub src_file: Option<PathBuf>,
}

impl From<ManifestEntry> for RawDescriptor {
    fn from(entry: ManifestEntry) -> Self {
        Self::Registry {
            runtime: entry.runtime,
            extension: entry.extension,
            src_file: entry.src_file,
        }
    }
}

/// Whether the descriptor denotes a rewritable source file.
pub fn is_source_function(descriptor: &FunctionDescriptor) -> bool {
    extension_is_supported(&descriptor.extension)
}

/// The descriptor's source path.
pub fn to_source_file(descriptor: &FunctionDescriptor) -> &Path {
    &descriptor.src_file
}

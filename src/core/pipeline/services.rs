//! Seams between the pipeline and its host.
//!
//! The host owns function enumeration and build-status reporting. Both are
//! modelled as traits so the pipeline can run under the CLI, inside another
//! build tool, or in tests.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, error, info};

use super::descriptor::{FunctionDescriptor, ManifestEntry, RawDescriptor};
use crate::core::errors::{InlineError, Result};
use crate::lang::registry::{extension_is_supported, registered_languages};

/// Host registry of deployable functions.
#[async_trait]
pub trait FunctionRegistry: Send + Sync {
    /// Enumerate every registered function. Fails when the registry is misconfigured.
    async fn list_all(&self) -> Result<Vec<RawDescriptor>>;
}

/// Host channel for the single terminal build status.
pub trait BuildReporter: Send + Sync {
    /// Mark the build as failed.
    fn fail_build(&self, message: &str, error: Option<&InlineError>);

    /// Show a non-fatal summary.
    fn show(&self, summary: &str);
}

/// Registry that lists the top level of a functions directory.
///
/// A file is a function. A sub-directory is a function whose main file is
/// `<dir>/<dir>.<ext>` or `<dir>/index.<ext>`.
#[derive(Debug, Clone)]
pub struct DirectoryRegistry {
    functions_src: PathBuf,
}

impl DirectoryRegistry {
    pub fn new(functions_src: impl Into<PathBuf>) -> Self {
        Self {
            functions_src: functions_src.into(),
        }
    }

    pub fn shared(functions_src: impl Into<PathBuf>) -> Arc<dyn FunctionRegistry> {
        Arc::new(Self::new(functions_src))
    }

    async fn main_file(dir: &Path) -> Option<PathBuf> {
        let name = dir.file_name()?.to_string_lossy().into_owned();
        for stem in [name.as_str(), "index"] {
            for info in registered_languages() {
                for ext in info.extensions {
                    let candidate = dir.join(format!("{stem}.{ext}"));
                    if tokio::fs::metadata(&candidate)
                        .await
                        .map(|m| m.is_file())
                        .unwrap_or(false)
                    {
                        return Some(candidate);
                    }
                }
            }
        }
        None
    }
}

#[async_trait]
impl FunctionRegistry for DirectoryRegistry {
    async fn list_all(&self) -> Result<Vec<RawDescriptor>> {
        let root = &self.functions_src;
        let metadata = tokio::fs::metadata(root).await.map_err(|e| {
            InlineError::io(
                format!("Functions directory {} is not accessible", root.display()),
                e,
            )
        })?;
        if !metadata.is_dir() {
            return Err(InlineError::config_field(
                format!("Functions path {} is not a directory", root.display()),
                "functions_src",
            ));
        }

        let mut entries = tokio::fs::read_dir(root).await.map_err(|e| {
            InlineError::io(format!("Failed to list {}", root.display()), e)
        })?;
        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| InlineError::io(format!("Failed to list {}", root.display()), e))?
        {
            paths.push(entry.path());
        }
        paths.sort();

        let mut descriptors = Vec::with_capacity(paths.len());
        for path in paths {
            let file_type = tokio::fs::metadata(&path).await.map_err(|e| {
                InlineError::io(format!("Failed to stat {}", path.display()), e)
            })?;

            let src_file = if file_type.is_dir() {
                match Self::main_file(&path).await {
                    Some(main) => main,
                    None => {
                        debug!("No main file in function directory {}", path.display());
                        continue;
                    }
                }
            } else {
                path
            };

            let mut descriptor = FunctionDescriptor::from_path(&src_file);
            if extension_is_supported(&descriptor.extension) {
                descriptor.runtime = "js".to_string();
            }
            descriptors.push(RawDescriptor::from_registry(descriptor));
        }

        Ok(descriptors)
    }
}

/// Registry backed by a JSON manifest of `{ runtime, extension, srcFile }` entries.
///
/// Relative `srcFile` values resolve against the manifest's directory.
#[derive(Debug, Clone)]
pub struct ManifestRegistry {
    path: PathBuf,
}

impl ManifestRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FunctionRegistry for ManifestRegistry {
    async fn list_all(&self) -> Result<Vec<RawDescriptor>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            InlineError::io(format!("Failed to read manifest {}", self.path.display()), e)
        })?;
        let entries: Vec<ManifestEntry> = serde_json::from_str(&content)?;
        let base = self.path.parent().unwrap_or_else(|| Path::new("."));

        Ok(entries
            .into_iter()
            .map(|mut entry| {
                entry.src_file = entry.src_file.map(|src| {
                    if src.is_relative() && !src.as_os_str().is_empty() {
                        base.join(src)
                    } else {
                        src
                    }
                });
                RawDescriptor::from(entry)
            })
            .collect())
    }
}

/// Fixed in-memory registry.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    descriptors: Vec<RawDescriptor>,
}

impl StaticRegistry {
    pub fn new(descriptors: Vec<RawDescriptor>) -> Self {
        Self { descriptors }
    }

    pub fn from_descriptors(descriptors: impl IntoIterator<Item = FunctionDescriptor>) -> Self {
        Self::new(descriptors.into_iter().map(RawDescriptor::from_registry).collect())
    }
}

#[async_trait]
impl FunctionRegistry for StaticRegistry {
    async fn list_all(&self) -> Result<Vec<RawDescriptor>> {
        Ok(self.descriptors.clone())
    }
}

/// Stand-in registry used when neither a functions directory nor a manifest is
/// configured. Enumeration always fails, so the run reports a registry failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredRegistry;

#[async_trait]
impl FunctionRegistry for UnconfiguredRegistry {
    async fn list_all(&self) -> Result<Vec<RawDescriptor>> {
        Err(InlineError::config_field(
            "no function registry configured: set functions_src or manifest",
            "functions_src",
        ))
    }
}

/// Reporter that prints to the terminal and remembers whether the build failed.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    failed: AtomicBool,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }
}

impl BuildReporter for ConsoleReporter {
    fn fail_build(&self, message: &str, error: Option<&InlineError>) {
        self.failed.store(true, Ordering::SeqCst);
        if let Some(err) = error {
            error!("{err:?}");
        }
        eprintln!("{message}");
    }

    fn show(&self, summary: &str) {
        info!("{summary}");
        println!("{summary}");
    }
}

/// Terminal status recorded by [`RecordingReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    Failed {
        message: String,
        error: Option<String>,
    },
    Shown {
        summary: String,
    },
}

/// Reporter that keeps every call, for embedding and tests.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        self.events.lock().clone()
    }
}

impl BuildReporter for RecordingReporter {
    fn fail_build(&self, message: &str, error: Option<&InlineError>) {
        self.events.lock().push(ReportEvent::Failed {
            message: message.to_string(),
            error: error.map(ToString::to_string),
        });
    }

    fn show(&self, summary: &str) {
        self.events.lock().push(ReportEvent::Shown {
            summary: summary.to_string(),
        });
    }
}

//! Pipeline orchestrator: discovery, concurrent rewrite, single terminal report.

use std::path::PathBuf;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::file_discovery::{discover, DiscoveryOptions};
use super::inliner::inline_file;
use super::services::{BuildReporter, FunctionRegistry};
use crate::core::config::{BuildEvent, InlinerConfig};
use crate::core::environment::EnvSnapshot;
use crate::core::errors::InlineError;
use crate::core::policy::InlinePolicy;
use crate::lang::transform::{SourceTransform, TreeSitterTransform};

/// Summary shown when discovery finds nothing to rewrite.
pub const SKIPPED_SUMMARY: &str = "Skipped processing because the project had no functions.";

/// Logs at `info` in verbose mode and at `debug` otherwise.
macro_rules! verbose {
    ($enabled:expr, $($arg:tt)*) => {
        if $enabled {
            info!($($arg)*);
        } else {
            debug!($($arg)*);
        }
    };
}

/// Lifecycle of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Discovering,
    EmptyReport,
    Transforming,
    Reported,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::EmptyReport | Self::Reported | Self::Failed)
    }
}

/// Terminal outcome of a run. Exactly one report reaches the host per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Discovery found no rewritable files
    Skipped,
    /// Every discovered file was rewritten
    Processed { files: usize },
    /// Discovery or at least one rewrite failed
    Failed {
        message: String,
        /// Number of files the run attempted to rewrite
        attempted: usize,
        /// File whose failure was reported, when the failure was per-file
        error_path: Option<PathBuf>,
    },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// Result of one spawned file transform.
enum TaskOutcome {
    Rewritten,
    Skipped(PathBuf),
    Failed(InlineError),
}

/// Drives discovery and the concurrent rewrite of every discovered file.
pub struct InlinePipeline<T: SourceTransform = TreeSitterTransform> {
    config: InlinerConfig,
    registry: Arc<dyn FunctionRegistry>,
    reporter: Arc<dyn BuildReporter>,
    engine: Arc<T>,
    env: EnvSnapshot,
}

impl InlinePipeline<TreeSitterTransform> {
    /// Create a pipeline using the tree-sitter engine and the current process environment.
    pub fn new(
        config: InlinerConfig,
        registry: Arc<dyn FunctionRegistry>,
        reporter: Arc<dyn BuildReporter>,
    ) -> Self {
        let engine = TreeSitterTransform::new().with_absent_variables(config.absent_variables);
        Self::with_engine(config, registry, reporter, Arc::new(engine))
    }
}

impl<T: SourceTransform> InlinePipeline<T> {
    /// Create a pipeline with a custom transform engine.
    pub fn with_engine(
        config: InlinerConfig,
        registry: Arc<dyn FunctionRegistry>,
        reporter: Arc<dyn BuildReporter>,
        engine: Arc<T>,
    ) -> Self {
        Self {
            config,
            registry,
            reporter,
            engine,
            env: EnvSnapshot::capture(),
        }
    }

    /// Replace the captured environment snapshot.
    pub fn with_env(mut self, env: EnvSnapshot) -> Self {
        self.env = env;
        self
    }

    pub fn config(&self) -> &InlinerConfig {
        &self.config
    }

    /// Inline policy derived from the configured include/exclude inputs.
    pub fn policy(&self) -> InlinePolicy {
        InlinePolicy::from_inputs(self.config.include.as_ref(), self.config.exclude.as_ref())
    }

    /// Whether this pipeline is registered for the given lifecycle hook.
    pub fn handles(&self, event: &BuildEvent) -> bool {
        &self.config.build_event == event
    }

    /// Run the pipeline if `event` is the configured hook.
    pub async fn on_event(&self, event: &BuildEvent) -> Option<RunOutcome> {
        if !self.handles(event) {
            debug!(
                "Ignoring hook {} (configured for {})",
                event, self.config.build_event
            );
            return None;
        }
        Some(self.run().await)
    }

    /// Discover, rewrite and report.
    pub async fn run(&self) -> RunOutcome {
        let verbose = self.config.verbose;
        let mut state = PipelineState::Idle;

        verbose!(
            verbose,
            "build env contains the following {} environment variables {:?}",
            self.env.len(),
            self.env.names().collect::<Vec<_>>()
        );

        transition(&mut state, PipelineState::Discovering);
        let options = DiscoveryOptions {
            inline_all: self.config.inline_all,
            functions_src: self.config.functions_src.clone(),
        };
        let files = match discover(self.registry.as_ref(), &options).await {
            Ok(files) => files,
            Err(err) => {
                transition(&mut state, PipelineState::Failed);
                let message = match &err {
                    InlineError::Discovery { message, .. } => message.clone(),
                    other => other.to_string(),
                };
                self.reporter.fail_build(&message, Some(&err));
                return RunOutcome::Failed {
                    message,
                    attempted: 0,
                    error_path: None,
                };
            }
        };

        if files.is_empty() {
            transition(&mut state, PipelineState::EmptyReport);
            self.reporter.show(SKIPPED_SUMMARY);
            return RunOutcome::Skipped;
        }

        transition(&mut state, PipelineState::Transforming);
        verbose!(verbose, "found function files {:?}", files);

        let policy = self.policy();
        verbose!(verbose, "flags.include= {:?}", policy.include);
        verbose!(verbose, "flags.exclude= {:?}", policy.exclude);

        let attempted = files.len();
        match self.transform_all(files, policy).await {
            Ok(()) => {
                transition(&mut state, PipelineState::Reported);
                self.reporter
                    .show(&format!("Processed {attempted} function file(s)."));
                RunOutcome::Processed { files: attempted }
            }
            Err((message, error_path)) => {
                transition(&mut state, PipelineState::Failed);
                RunOutcome::Failed {
                    message,
                    attempted,
                    error_path,
                }
            }
        }
    }

    /// Rewrite every file concurrently.
    ///
    /// The first failure is reported to the host as soon as it is observed.
    /// Transforms already running are awaited but never rolled back.
    async fn transform_all(
        &self,
        files: Vec<PathBuf>,
        policy: InlinePolicy,
    ) -> std::result::Result<(), (String, Option<PathBuf>)> {
        let policy = Arc::new(policy);
        let semaphore = self
            .config
            .max_concurrency
            .map(|limit| Arc::new(Semaphore::new(limit.max(1))));
        let cancel = CancellationToken::new();
        let cancel_on_failure = self.config.cancel_on_failure;

        let mut tasks: FuturesUnordered<_> = files
            .into_iter()
            .map(|path| {
                let policy = Arc::clone(&policy);
                let env = self.env.clone();
                let engine = Arc::clone(&self.engine);
                let semaphore = semaphore.clone();
                let cancel = cancel.clone();

                tokio::spawn(async move {
                    let _permit = match semaphore {
                        Some(semaphore) => tokio::select! {
                            biased;
                            _ = cancel.cancelled() => return TaskOutcome::Skipped(path),
                            permit = semaphore.acquire_owned() => match permit {
                                Ok(permit) => Some(permit),
                                Err(e) => {
                                    return TaskOutcome::Failed(InlineError::internal(format!(
                                        "Concurrency limiter closed: {e}"
                                    )))
                                }
                            },
                        },
                        None => None,
                    };
                    if cancel.is_cancelled() {
                        return TaskOutcome::Skipped(path);
                    }

                    match inline_file(&path, &policy, &env, engine).await {
                        Ok(()) => TaskOutcome::Rewritten,
                        Err(err) => {
                            if cancel_on_failure {
                                cancel.cancel();
                            }
                            TaskOutcome::Failed(err)
                        }
                    }
                })
            })
            .collect();

        let mut first_failure: Option<(String, Option<PathBuf>)> = None;
        let mut rewritten = 0usize;
        let mut skipped = 0usize;

        while let Some(joined) = tasks.next().await {
            let outcome = joined.unwrap_or_else(|e| TaskOutcome::Failed(e.into()));
            match outcome {
                TaskOutcome::Rewritten => rewritten += 1,
                TaskOutcome::Skipped(path) => {
                    skipped += 1;
                    debug!("Skipped {} after an earlier failure", path.display());
                }
                TaskOutcome::Failed(err) if first_failure.is_none() => {
                    let message = format!(
                        "Failed to inline function files due to the following error:\n{err}"
                    );
                    self.reporter.fail_build(&message, Some(&err));
                    first_failure = Some((message, err.file_path().map(PathBuf::from)));
                }
                TaskOutcome::Failed(err) => warn!("Additional rewrite failure: {err}"),
            }
        }

        debug!("Rewrite finished: {rewritten} rewritten, {skipped} skipped");
        match first_failure {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }
}

fn transition(state: &mut PipelineState, next: PipelineState) {
    debug!("pipeline state {:?} -> {:?}", state, next);
    *state = next;
}

/// Run the pipeline once with a directory or manifest registry built from `config`.
pub async fn run_with_config(
    config: InlinerConfig,
    reporter: Arc<dyn BuildReporter>,
) -> RunOutcome {
    let registry = super::registry_from_config(&config);
    InlinePipeline::new(config, registry, reporter).run().await
}

#[cfg(test)]
#[path = "pipeline_executor_tests.rs"]
mod tests;

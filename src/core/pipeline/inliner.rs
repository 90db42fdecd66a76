//! Per-file variable inlining.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, trace};

use crate::core::environment::EnvSnapshot;
use crate::core::errors::{InlineError, Result};
use crate::core::policy::InlinePolicy;
use crate::lang::transform::SourceTransform;

/// Rewrite one source file in place.
///
/// The file is read, parsed, rewritten and written back. Parsing and printing
/// run on the blocking pool; failures carry the file's path.
pub async fn inline_file<T: SourceTransform>(
    path: &Path,
    policy: &InlinePolicy,
    env: &EnvSnapshot,
    engine: Arc<T>,
) -> Result<()> {
    info!("inlining {}", path.display());

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| InlineError::read(path, e))?;

    let owned_path = path.to_path_buf();
    let policy = policy.clone();
    let env = env.clone();
    let rewritten = tokio::task::spawn_blocking(move || -> Result<String> {
        let tree = engine
            .parse(&owned_path, text)
            .map_err(|e| e.in_file(&owned_path))?;
        let tree = engine.substitute(tree, &policy, &env)?;
        Ok(engine.print(&tree))
    })
    .await
    .map_err(|e| InlineError::from(e).with_context(format!("While rewriting {}", path.display())))??;

    trace!("transformed code for {}:\n{}", path.display(), rewritten);

    tokio::fs::write(path, rewritten)
        .await
        .map_err(|e| InlineError::write(path, e))
}

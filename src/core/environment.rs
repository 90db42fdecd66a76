//! Build-time environment snapshot.
//!
//! The process environment is read exactly once, when the pipeline starts.
//! Every concurrent file transform sees the same immutable mapping.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

/// Immutable copy of the build-time environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: Arc<BTreeMap<String, String>>,
}

impl EnvSnapshot {
    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 cannot be rendered as
    /// JavaScript string literals and are skipped.
    pub fn capture() -> Self {
        let mut vars = BTreeMap::new();
        for (key, value) in std::env::vars_os() {
            match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => {
                    vars.insert(key, value);
                }
                (Ok(key), Err(_)) => warn!("Skipping environment variable {key} with non UTF-8 value"),
                (Err(key), _) => warn!("Skipping environment variable {key:?} with non UTF-8 name"),
            }
        }
        Self {
            vars: Arc::new(vars),
        }
    }

    /// Build a snapshot from explicit pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: Arc::new(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Variable names, sorted. Values are deliberately not exposed for logging.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

//! Configuration types and management for envinline.
//!
//! The host passes plugin inputs in camelCase (`inlineAll`, `buildEvent`), while
//! configuration files use snake_case. Both spellings are accepted.

pub mod validation;

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{InlineError, Result};

pub use validation::{validate_positive_usize, validate_variable_name};

/// Default configuration file names looked up in the working directory.
pub const DEFAULT_CONFIG_FILES: &[&str] = &[".envinline.yml", ".envinline.yaml"];

/// Raw include/exclude input: a delimited string or an already-structured list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NameListInput {
    /// `"API_KEY,NODE_ENV"` or `"API_KEY NODE_ENV"`
    Delimited(String),
    /// `["API_KEY", "NODE_ENV"]`
    List(Vec<String>),
}

impl NameListInput {
    /// Normalize into a set of trimmed, non-empty names.
    pub fn normalize(&self) -> BTreeSet<String> {
        match self {
            Self::Delimited(raw) => split_names(raw).collect(),
            Self::List(items) => items.iter().flat_map(|item| split_names(item)).collect(),
        }
    }
}

fn split_names(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Lifecycle hook that triggers the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuildEvent {
    #[default]
    PreBuild,
    Build,
    PostBuild,
    Custom(String),
}

impl BuildEvent {
    pub fn as_str(&self) -> &str {
        match self {
            Self::PreBuild => "onPreBuild",
            Self::Build => "onBuild",
            Self::PostBuild => "onPostBuild",
            Self::Custom(name) => name,
        }
    }
}

impl From<String> for BuildEvent {
    fn from(name: String) -> Self {
        match name.trim() {
            "" | "onPreBuild" => Self::PreBuild,
            "onBuild" => Self::Build,
            "onPostBuild" => Self::PostBuild,
            _ => Self::Custom(name),
        }
    }
}

impl From<&str> for BuildEvent {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<BuildEvent> for String {
    fn from(event: BuildEvent) -> Self {
        event.as_str().to_string()
    }
}

impl fmt::Display for BuildEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an eligible reference to a variable that is not set is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbsentVariables {
    /// Leave the live `process.env` lookup in place
    #[default]
    Keep,
    /// Replace the lookup with `undefined`
    Undefined,
}

/// Main configuration for an envinline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InlinerConfig {
    /// Hook that triggers the pipeline
    #[serde(alias = "buildEvent")]
    pub build_event: BuildEvent,

    /// Also rewrite every file found by a recursive scan of `functions_src`
    #[serde(alias = "inlineAll")]
    pub inline_all: bool,

    /// Log intermediate discovery and filter state
    pub verbose: bool,

    /// Variables eligible for inlining (absent or empty means all)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<NameListInput>,

    /// Variables never inlined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<NameListInput>,

    /// Functions source directory (registry root and scan root)
    #[serde(alias = "FUNCTIONS_SRC", skip_serializing_if = "Option::is_none")]
    pub functions_src: Option<PathBuf>,

    /// JSON manifest of function descriptors, used instead of listing `functions_src`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,

    /// Maximum number of concurrent file transforms (unbounded when unset)
    #[serde(alias = "maxConcurrency", skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<usize>,

    /// Skip transforms that have not started yet once one has failed
    #[serde(alias = "cancelOnFailure")]
    pub cancel_on_failure: bool,

    /// Rendering of eligible references to unset variables
    #[serde(alias = "absentVariables")]
    pub absent_variables: AbsentVariables,
}

impl Default for InlinerConfig {
    fn default() -> Self {
        Self {
            build_event: BuildEvent::default(),
            inline_all: false,
            verbose: false,
            include: None,
            exclude: None,
            functions_src: None,
            manifest: None,
            max_concurrency: None,
            cancel_on_failure: false,
            absent_variables: AbsentVariables::default(),
        }
    }
}

impl InlinerConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            InlineError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        serde_yaml::from_str(&content).map_err(Into::into)
    }

    /// Serialize the configuration as YAML
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(Into::into)
    }

    /// Find a default configuration file in `dir`, if one exists.
    pub fn find_default_file(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        validate_positive_usize(self.max_concurrency, "max_concurrency")?;

        if self.inline_all && self.functions_src.is_none() {
            return Err(InlineError::config_field(
                "inline_all requires functions_src to be set",
                "functions_src",
            ));
        }

        if self.functions_src.is_none() && self.manifest.is_none() {
            return Err(InlineError::config_field(
                "either functions_src or manifest must be set",
                "functions_src",
            ));
        }

        for (field, input) in [("include", &self.include), ("exclude", &self.exclude)] {
            if let Some(input) = input {
                for name in input.normalize() {
                    validate_variable_name(&name, field)?;
                }
            }
        }

        Ok(())
    }
}

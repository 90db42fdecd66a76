//! Include/exclude policy governing which variables may be inlined.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::config::NameListInput;

/// Which environment variable names are eligible for substitution.
///
/// An empty include set means every name is a candidate. The exclude set is
/// applied after the include set narrows the candidates, so a name listed in
/// both is never inlined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlinePolicy {
    pub include: BTreeSet<String>,
    pub exclude: BTreeSet<String>,
}

impl InlinePolicy {
    pub fn new<I, E, S>(include: I, exclude: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: include.into_iter().map(Into::into).collect(),
            exclude: exclude.into_iter().map(Into::into).collect(),
        }
    }

    /// Derive the policy from raw configuration input.
    pub fn from_inputs(include: Option<&NameListInput>, exclude: Option<&NameListInput>) -> Self {
        Self {
            include: include.map(NameListInput::normalize).unwrap_or_default(),
            exclude: exclude.map(NameListInput::normalize).unwrap_or_default(),
        }
    }

    /// Whether a reference to `name` may be replaced.
    pub fn is_eligible(&self, name: &str) -> bool {
        (self.include.is_empty() || self.include.contains(name)) && !self.exclude.contains(name)
    }
}

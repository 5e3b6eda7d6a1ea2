//! Agent mode: whether a request runs with tools attached.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Selects how a request is dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentMode {
    /// Single direct completion, no tools.
    #[default]
    None,
    /// Agent executor with the refactor tool set attached.
    Refactor,
}

impl AgentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Refactor => "refactor",
        }
    }

    /// Whether this mode attaches tools to the model.
    pub fn uses_tools(&self) -> bool {
        matches!(self, Self::Refactor)
    }
}

impl std::fmt::Display for AgentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "refactor" => Ok(Self::Refactor),
            other => Err(Error::InvalidMode(other.to_string())),
        }
    }
}

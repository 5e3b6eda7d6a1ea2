//! Chat UI message model.
//!
//! The interactive chat surface keeps its own list of entries, separate from
//! the model-facing turn list. Entries with a metadata title are display-only
//! annotations (tool usage) and are never sent back to the model.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Display metadata attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMetadata {
    pub title: String,
}

/// A single entry shown in the chat UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ChatMetadata>,
}

impl ChatEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            metadata: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            metadata: None,
        }
    }

    /// An assistant-side annotation rendered under `title`.
    pub fn annotation(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            metadata: Some(ChatMetadata {
                title: title.into(),
            }),
        }
    }

    pub fn is_annotation(&self) -> bool {
        self.metadata.is_some()
    }
}

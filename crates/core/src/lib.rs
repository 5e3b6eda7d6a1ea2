//! # Scrivener Core
//!
//! Domain types, traits, and error definitions for the Scrivener prompt
//! orchestrator. This crate has **no I/O dependencies**: it defines the
//! domain model that the provider, tool and agent crates implement against.
//!
//! ## Layout
//!
//! - [`message`]: role-tagged turns that make up a conversation
//! - [`provider`]: the LLM backend abstraction
//! - [`tool`]: tool trait and registry handed to agent executors
//! - [`mode`] / [`sources`]: per-request selectors (tool mode, input/output folders)
//! - [`chat`]: the chat UI's message model

pub mod chat;
pub mod error;
pub mod message;
pub mod mode;
pub mod provider;
pub mod sources;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use chat::{ChatEntry, ChatRole};
pub use error::{Error, Result};
pub use message::{Message, MessageToolCall, Role};
pub use mode::AgentMode;
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use sources::FileSources;
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};

//! Refactor tool set for Scrivener.
//!
//! The tools let the model inspect and edit the source tree named by a
//! request's [`FileSources`]. Every path argument is relative to the source
//! folder and is resolved through [`sandbox::resolve_in_root`].

pub mod file_read;
pub mod file_write;
pub mod list_files;
pub mod sandbox;

use scrivener_core::FileSources;
use scrivener_core::tool::ToolRegistry;

pub use file_read::FileReadTool;
pub use file_write::FileWriteTool;
pub use list_files::ListFilesTool;
pub use sandbox::{PathValidationError, resolve_in_root};

/// Build the tool set attached to refactor-mode requests.
pub fn refactor_toolset(sources: &FileSources) -> ToolRegistry {
    let root = sources.source_folder.clone();
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(FileReadTool::new(&root)));
    registry.register(Box::new(FileWriteTool::new(&root)));
    registry.register(Box::new(ListFilesTool::new(&root)));
    tracing::debug!(root = %root.display(), tools = registry.len(), "Built refactor tool set");
    registry
}

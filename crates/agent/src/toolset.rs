//! Process-wide refactor tool set, built once on first use.

use scrivener_core::sources::FileSources;
use scrivener_core::tool::ToolRegistry;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

/// Lazily initialised, shared tool registry.
///
/// The first caller's [`FileSources`] decide the sandbox root; later callers
/// get the same registry regardless of the sources they pass. Clones share
/// the cell.
#[derive(Clone, Default)]
pub struct SharedToolSet {
    cell: Arc<OnceCell<Arc<ToolRegistry>>>,
}

impl SharedToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the registry, building it from `sources` if this is the first
    /// call. Concurrent first calls initialise exactly once.
    pub async fn get_or_init(&self, sources: &FileSources) -> Arc<ToolRegistry> {
        self.cell
            .get_or_init(|| async {
                let registry = scrivener_tools::refactor_toolset(sources);
                info!(
                    root = %sources.source_folder.display(),
                    tools = registry.len(),
                    "Created agent tools"
                );
                Arc::new(registry)
            })
            .await
            .clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

impl std::fmt::Debug for SharedToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedToolSet")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

//! Directory listing tool: lets the model discover files before reading them.

use crate::sandbox::resolve_in_root;
use async_trait::async_trait;
use scrivener_core::error::ToolError;
use scrivener_core::tool::{Tool, ToolResult};
use std::path::{Path, PathBuf};

/// Hard cap on entries returned for one listing.
const MAX_ENTRIES: usize = 500;

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &[".git", "node_modules", "target", "__pycache__", ".venv"];

pub struct ListFilesTool {
    root: PathBuf,
}

impl ListFilesTool {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Walk `dir`, collecting sorted paths relative to `base`.
    async fn walk(base: &Path, dir: &Path, recursive: bool) -> std::io::Result<Vec<String>> {
        let mut out = Vec::new();
        let mut pending = vec![dir.to_path_buf()];

        while let Some(current) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&current).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let name = entry.file_name().to_string_lossy().to_string();
                let is_dir = entry.file_type().await?.is_dir();

                if is_dir && SKIPPED_DIRS.contains(&name.as_str()) {
                    continue;
                }

                let rel = path
                    .strip_prefix(base)
                    .unwrap_or(&path)
                    .to_string_lossy()
                    .replace('\\', "/");

                if is_dir {
                    out.push(format!("{rel}/"));
                    if recursive {
                        pending.push(path);
                    }
                } else {
                    out.push(rel);
                }

                if out.len() >= MAX_ENTRIES {
                    out.sort();
                    return Ok(out);
                }
            }
        }

        out.sort();
        Ok(out)
    }
}

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "List files under a directory of the source folder. Directories end with '/'."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Directory relative to the source folder (default: the folder itself)"
                },
                "recursive": {
                    "type": "boolean",
                    "description": "Descend into subdirectories (default: true)"
                }
            }
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = arguments["path"].as_str().unwrap_or(".");
        let recursive = arguments["recursive"].as_bool().unwrap_or(true);

        let dir = resolve_in_root(&self.root, path).map_err(|e| ToolError::PermissionDenied {
            tool_name: "list_files".into(),
            reason: e.to_string(),
        })?;

        let base = self.root.canonicalize().unwrap_or_else(|_| self.root.clone());

        match Self::walk(&base, &dir, recursive).await {
            Ok(entries) if entries.is_empty() => Ok(ToolResult::ok("(empty directory)")),
            Ok(entries) => Ok(ToolResult::ok(entries.join("\n"))),
            Err(e) => Ok(ToolResult::failed(format!("Failed to list directory: {e}"))),
        }
    }
}

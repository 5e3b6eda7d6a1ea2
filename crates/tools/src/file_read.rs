//! File read tool: read a file under the source folder.

use crate::sandbox::resolve_in_root;
use async_trait::async_trait;
use scrivener_core::error::ToolError;
use scrivener_core::tool::{Tool, ToolResult};
use std::path::{Path, PathBuf};

pub struct FileReadTool {
    root: PathBuf,
}

impl FileReadTool {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl Tool for FileReadTool {
    fn name(&self) -> &str {
        "file_read"
    }

    fn description(&self) -> &str {
        "Read the contents of a file. The path is relative to the project source folder."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The file path to read, relative to the source folder"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = arguments["path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'path' argument".into()))?;

        let resolved =
            resolve_in_root(&self.root, path).map_err(|e| ToolError::PermissionDenied {
                tool_name: "file_read".into(),
                reason: e.to_string(),
            })?;

        match tokio::fs::read_to_string(&resolved).await {
            Ok(content) => Ok(ToolResult::ok(content)),
            Err(e) => Ok(ToolResult::failed(format!("Failed to read file: {e}"))),
        }
    }
}

use crate::tools::{parse_input, require_path, resolve_path};
use crate::traits::{Tool, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteInput {
    pub path: String,
}

pub struct DeleteTool {
    base_dir: std::path::PathBuf,
}

impl DeleteTool {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }
}

fn remove(path: &Path) -> std::io::Result<bool> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };

    let removed = if metadata.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };

    match removed {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl Tool for DeleteTool {
    fn name(&self) -> &str {
        "delete"
    }

    fn description(&self) -> &str {
        "Delete a file or recursively delete a directory. Deleting a path that does not exist succeeds"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the file or directory to delete"
                }
            },
            "required": ["path"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, input: serde_json::Value) -> anyhow::Result<ToolResult> {
        let input: DeleteInput = parse_input(self.name(), input)?;
        let path = require_path(self.name(), &input.path)?;
        let full_path = resolve_path(&self.base_dir, path);

        match remove(&full_path) {
            Ok(true) => Ok(ToolResult::success(format!("Deleted {}", path))),
            Ok(false) => Ok(ToolResult::success(format!(
                "{} does not exist; nothing to delete",
                path
            ))),
            Err(e) => Ok(ToolResult::error(format!("Failed to delete {}: {}", path, e))),
        }
    }
}

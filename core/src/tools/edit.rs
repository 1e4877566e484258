use crate::tools::{ToolError, parse_input, require_path, resolve_path};
use crate::traits::{Tool, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditInput {
    pub path: String,
    pub old: String,
    pub new: String,
}

pub struct EditTool {
    base_dir: std::path::PathBuf,
}

impl EditTool {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    fn create(&self, full_path: &Path, path: &str, content: &str) -> ToolResult {
        if let Some(parent) = full_path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            return ToolResult::error(format!(
                "Failed to create parent directories for {}: {}",
                path, e
            ));
        }

        match std::fs::write(full_path, content) {
            Ok(()) => ToolResult::success(format!("Created {}", path)),
            Err(e) => ToolResult::error(format!("Failed to create {}: {}", path, e)),
        }
    }

    fn replace(&self, full_path: &Path, path: &str, content: &str, input: &EditInput) -> ToolResult {
        if input.old.is_empty() {
            return ToolResult::error(format!(
                "{} already exists; 'old' must be non-empty to edit it",
                path
            ));
        }

        let occurrences = content.matches(input.old.as_str()).count();
        if occurrences == 0 {
            return ToolResult::error(format!("'old' text not found in {}", path));
        }

        let updated = content.replace(input.old.as_str(), &input.new);
        match std::fs::write(full_path, updated) {
            Ok(()) => ToolResult::success(format!(
                "Replaced {} occurrence(s) in {}",
                occurrences, path
            )),
            Err(e) => ToolResult::error(format!("Failed to write {}: {}", path, e)),
        }
    }
}

#[async_trait]
impl Tool for EditTool {
    fn name(&self) -> &str {
        "edit"
    }

    fn description(&self) -> &str {
        "Replace every occurrence of 'old' with 'new' in a file. With an empty 'old' and a path that does not exist, creates the file (and parent directories) containing 'new'"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the file to edit or create"
                },
                "old": {
                    "type": "string",
                    "description": "Exact text to replace; empty to create a new file"
                },
                "new": {
                    "type": "string",
                    "description": "Replacement text, or the content of the new file"
                }
            },
            "required": ["path", "old", "new"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, input: serde_json::Value) -> anyhow::Result<ToolResult> {
        let input: EditInput = parse_input(self.name(), input)?;
        let path = require_path(self.name(), &input.path)?;
        if input.old == input.new {
            return Err(ToolError::invalid(self.name(), "'old' and 'new' must differ").into());
        }
        let full_path = resolve_path(&self.base_dir, path);

        match std::fs::read_to_string(&full_path) {
            Ok(content) => Ok(self.replace(&full_path, path, &content, &input)),
            Err(e) if e.kind() == ErrorKind::NotFound && input.old.is_empty() => {
                Ok(self.create(&full_path, path, &input.new))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Ok(ToolResult::error(format!("File not found: {}", path)))
            }
            Err(e) => Ok(ToolResult::error(format!("Failed to read {}: {}", path, e))),
        }
    }
}

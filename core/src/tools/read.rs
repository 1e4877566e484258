use crate::tools::{parse_input, require_path, resolve_path};
use crate::traits::{Tool, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadInput {
    pub path: String,
}

pub struct ReadTool {
    base_dir: std::path::PathBuf,
}

impl ReadTool {
    pub fn new(base_dir: impl AsRef<std::path::Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl Tool for ReadTool {
    fn name(&self) -> &str {
        "read"
    }

    fn description(&self) -> &str {
        "Read the full text content of a file"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the file to read"
                }
            },
            "required": ["path"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, input: serde_json::Value) -> anyhow::Result<ToolResult> {
        let input: ReadInput = parse_input(self.name(), input)?;
        let path = require_path(self.name(), &input.path)?;
        let full_path = resolve_path(&self.base_dir, path);

        match std::fs::read_to_string(&full_path) {
            Ok(content) => Ok(ToolResult::success(content)),
            Err(e) => Ok(ToolResult::error(format!(
                "Failed to read file {}: {}",
                path, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn reads_full_content() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "line one\nline two\n").unwrap();

        let result = ReadTool::new(tmp.path())
            .execute(json!({"path": "a.txt"}))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.output, "line one\nline two\n");
    }

    #[tokio::test]
    async fn missing_file_is_descriptive_text() {
        let tmp = TempDir::new().unwrap();

        let result = ReadTool::new(tmp.path())
            .execute(json!({"path": "nope.txt"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.to_text().contains("Failed to read file nope.txt"));
    }

    #[tokio::test]
    async fn missing_path_argument_is_rejected() {
        let tmp = TempDir::new().unwrap();

        let err = ReadTool::new(tmp.path())
            .execute(json!({}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid input for 'read'"));
    }
}

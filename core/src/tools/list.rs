use crate::tools::{parse_input, resolve_path};
use crate::traits::{Tool, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;

const DEFAULT_PATH: &str = ".";
const DIR_SUFFIX: char = '/';

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListInput {
    #[serde(default)]
    pub path: Option<String>,
}

pub struct ListTool {
    base_dir: std::path::PathBuf,
}

impl ListTool {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }
}

/// Sorted entry names, directories suffixed with `/`.
fn list_entries(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let mut name = entry.file_name().to_string_lossy().into_owned();
        // Follows symlinks, so a link to a directory lists as a directory.
        if entry.path().is_dir() {
            name.push(DIR_SUFFIX);
        }
        entries.push(name);
    }
    entries.sort();
    Ok(entries)
}

#[async_trait]
impl Tool for ListTool {
    fn name(&self) -> &str {
        "list"
    }

    fn description(&self) -> &str {
        "List the entries of a directory as a JSON array; directory names end with '/'. Defaults to the current directory"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Directory to list (default: current directory)"
                }
            },
            "additionalProperties": false
        })
    }

    async fn execute(&self, input: serde_json::Value) -> anyhow::Result<ToolResult> {
        let input: ListInput = parse_input(self.name(), input)?;
        let path = input
            .path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(DEFAULT_PATH);
        let full_path = resolve_path(&self.base_dir, path);

        match list_entries(&full_path) {
            Ok(entries) => Ok(ToolResult::success(serde_json::to_string(&entries)?)),
            Err(e) => Ok(ToolResult::error(format!(
                "Failed to list directory {}: {}",
                path, e
            ))),
        }
    }
}

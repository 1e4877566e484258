use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub mod delete;
pub mod edit;
pub mod list;
pub mod read;

pub use delete::DeleteTool;
pub use edit::EditTool;
pub use list::ListTool;
pub use read::ReadTool;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("invalid input for '{tool}': {reason}")]
    InvalidInput { tool: String, reason: String },
}

impl ToolError {
    pub fn invalid(tool: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            tool: tool.to_string(),
            reason: reason.into(),
        }
    }
}

/// Deserializes a tool's raw input into its declared input type.
pub fn parse_input<T: DeserializeOwned>(tool: &str, input: Value) -> Result<T, ToolError> {
    // A bare `null` means the model sent no input at all.
    let input = if input.is_null() {
        Value::Object(Default::default())
    } else {
        input
    };
    serde_json::from_value::<T>(input).map_err(|e| ToolError::invalid(tool, e.to_string()))
}

pub fn require_path<'a>(tool: &str, path: &'a str) -> Result<&'a str, ToolError> {
    if path.trim().is_empty() {
        return Err(ToolError::invalid(tool, "'path' must not be empty"));
    }
    Ok(path)
}

/// Relative paths resolve against `base`; absolute paths are taken as-is.
pub fn resolve_path(base: &Path, path: &str) -> PathBuf {
    base.join(path)
}

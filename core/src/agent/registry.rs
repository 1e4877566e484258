use crate::agent::parser::ToolCall;
use crate::tools::{DeleteTool, EditTool, ListTool, ReadTool};
use crate::traits::{Tool, ToolResult, ToolSpec};
use anyhow::{Result, bail};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Ordered, name-unique set of tools. Built once at startup.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `read`, `list`, `edit` and `delete`, resolving relative paths against `base_dir`.
    pub fn with_builtin_tools(base_dir: impl AsRef<Path>) -> Self {
        let base_dir = base_dir.as_ref();
        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(ReadTool::new(base_dir)),
            Arc::new(ListTool::new(base_dir)),
            Arc::new(EditTool::new(base_dir)),
            Arc::new(DeleteTool::new(base_dir)),
        ];
        Self { tools }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        if self.get(tool.name()).is_some() {
            bail!("Tool '{}' is already registered", tool.name());
        }
        self.tools.push(tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Runs a parsed call. Never fails: unknown tools, rejected input and
    /// tool errors all come back as a failed `ToolResult`.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        let Some(tool) = self.get(&call.name) else {
            warn!(tool = %call.name, "unknown tool requested");
            return ToolResult::error(format!(
                "Unknown tool '{}'. Available tools: {}",
                call.name,
                self.names().join(", ")
            ));
        };

        info!(tool = %call.name, "executing tool");
        let input = serde_json::Value::Object(call.input.clone());
        let result = match tool.execute(input).await {
            Ok(result) => result,
            Err(e) => ToolResult::error(format!("{:#}", e)),
        };

        if !result.success {
            warn!(
                tool = %call.name,
                error = result.error.as_deref().unwrap_or_default(),
                "tool returned an error"
            );
        }
        result
    }
}

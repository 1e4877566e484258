use crate::agent::parser::{TOOL_CALL_END, TOOL_CALL_START};
use crate::traits::ToolSpec;
use std::fmt::Write;
use std::path::{Path, PathBuf};

const IDENTITY: &str = "You are quill, a coding assistant running in the user's terminal. \
You can inspect and change files on the user's machine with the tools below. \
Be concise, and check the result of every change you make.";

pub struct ContextBuilder {
    pub working_dir: PathBuf,
    pub tool_specs: Vec<ToolSpec>,
}

impl ContextBuilder {
    pub fn new(working_dir: impl AsRef<Path>) -> Self {
        Self {
            working_dir: working_dir.as_ref().to_path_buf(),
            tool_specs: vec![],
        }
    }

    pub fn with_tool_specs(mut self, tool_specs: Vec<ToolSpec>) -> Self {
        self.tool_specs = tool_specs;
        self
    }

    pub fn build_system_prompt(&self) -> String {
        let mut parts = vec![IDENTITY.to_string()];

        if !self.tool_specs.is_empty() {
            parts.push(self.get_tool_instructions());
        }
        parts.push(self.get_runtime_context());

        parts.join("\n\n---\n\n")
    }

    fn get_tool_instructions(&self) -> String {
        let mut instructions = String::new();
        instructions.push_str("## Tool Use Protocol\n\n");
        let _ = writeln!(
            instructions,
            "To use a tool, reply with a JSON object wrapped in {} tags:\n",
            TOOL_CALL_START
        );
        let _ = writeln!(
            instructions,
            "{}\n{{\"name\": \"tool_name\", \"input\": {{\"param\": \"value\"}}}}\n{}\n",
            TOOL_CALL_START, TOOL_CALL_END
        );
        instructions.push_str("Rules:\n");
        instructions.push_str("- At most ONE tool call per reply. Any text before the tag is shown to the user as your reasoning.\n");
        instructions.push_str("- Stop after the closing tag and wait. The outcome arrives in the next message, starting with \"Tool result:\".\n");
        instructions.push_str("- When the task is finished, reply in plain text without any tool call.\n\n");
        instructions.push_str("### Available Tools\n\n");

        for tool in &self.tool_specs {
            let _ = writeln!(
                instructions,
                "**{}**: {}\nInput schema: `{}`\n",
                tool.name, tool.description, tool.parameters_schema
            );
        }

        instructions
    }

    fn get_runtime_context(&self) -> String {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M (%A)");

        format!(
            "## Runtime Context

### Current Time
{}

### Working Directory
{}

Relative paths are resolved against the working directory.",
            timestamp,
            self.working_dir.display()
        )
    }
}

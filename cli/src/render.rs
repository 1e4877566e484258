use console::style;
use quill_core::agent::{AgentEvent, ToolCall};
use quill_core::traits::ToolResult;

const PREVIEW_CHARS: usize = 160;
const PREVIEW_LINES: usize = 8;

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max).collect();
    format!("{}…", truncated)
}

fn preview_lines(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= PREVIEW_LINES {
        return text.trim_end().to_string();
    }
    format!(
        "{}\n… ({} more lines)",
        lines[..PREVIEW_LINES].join("\n"),
        lines.len() - PREVIEW_LINES
    )
}

fn describe_call(call: &ToolCall) -> String {
    let input = serde_json::Value::Object(call.input.clone()).to_string();
    format!("{} {}", call.name, truncate_chars(&input, PREVIEW_CHARS))
}

fn print_tool_result(result: &ToolResult) {
    let text = preview_lines(&result.to_text());
    for line in text.lines() {
        if result.success {
            println!("  {}", style(line).dim());
        } else {
            println!("  {}", style(line).red());
        }
    }
}

pub fn print_event(event: AgentEvent<'_>) {
    match event {
        AgentEvent::Thinking(text) => println!("{}", style(text).italic().dim()),
        AgentEvent::ToolCall(call) => {
            println!("{} {}", style("⚙").cyan().bold(), describe_call(call));
        }
        AgentEvent::ToolResult { result, .. } => print_tool_result(result),
        AgentEvent::MalformedCall(error) => {
            println!("{} malformed tool call: {}", style("!").yellow().bold(), error);
        }
        AgentEvent::StepLimitReached(steps) => {
            println!(
                "{} Stopped after {} tool calls in one turn.",
                style("!").yellow().bold(),
                steps
            );
        }
    }
}

pub fn print_reply(text: &str) {
    if text.trim().is_empty() {
        println!("{}", style("(empty reply)").dim());
        return;
    }
    termimad::MadSkin::default().print_text(text);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé…");
        assert_eq!(truncate_chars("hi", 2), "hi");
    }

    #[test]
    fn long_results_are_previewed() {
        let text = (1..=10).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let preview = preview_lines(&text);
        assert!(preview.ends_with("… (2 more lines)"));
        assert!(preview.starts_with("1\n2"));
    }
}

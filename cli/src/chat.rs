use crate::ChatArgs;
use crate::render;
use anyhow::{Context, Result};
use console::style;
use quill_core::agent::{AgentLoop, ContextBuilder, Conversation, ToolRegistry, TurnOutcome};
use quill_core::{config, providers};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::sync::Arc;
use tracing::{info, warn};

impl ChatArgs {
    fn apply(&self, config: &mut config::Config) {
        if let Some(provider) = &self.provider {
            config.provider = provider.clone();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = Some(base_url.clone());
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(max_steps) = self.max_steps {
            config.max_steps = max_steps;
        }
    }
}

async fn run_turn(agent: &AgentLoop, conversation: &mut Conversation, input: &str) -> Result<()> {
    println!("\n{}\n", style("🤔 Thinking...").dim());

    match agent.run_turn(conversation, input, render::print_event).await? {
        TurnOutcome::Reply(text) => render::print_reply(&text),
        TurnOutcome::StepLimitReached { .. } => {
            println!("{}", style("Send another message to let it continue.").dim());
        }
    }
    Ok(())
}

pub async fn run(args: ChatArgs) -> Result<()> {
    let mut config = config::load_config()?;
    config.apply_env(|var| std::env::var(var).ok());
    args.apply(&mut config);

    let working_dir = match &args.cwd {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Could not determine the current directory")?,
    };
    let working_dir = std::fs::canonicalize(&working_dir)
        .with_context(|| format!("Working directory {} is not accessible", working_dir.display()))?;

    let provider = providers::create_provider(&config)?;
    let tool_registry = Arc::new(ToolRegistry::with_builtin_tools(&working_dir));
    let system_prompt = ContextBuilder::new(&working_dir)
        .with_tool_specs(tool_registry.specs())
        .build_system_prompt();

    info!(
        provider = provider.name(),
        model = provider.model(),
        working_dir = %working_dir.display(),
        "starting session"
    );

    let agent = AgentLoop::new(provider, tool_registry)
        .with_max_steps(config.max_steps)
        .with_temperature(config.temperature);
    let mut conversation = Conversation::new(system_prompt);

    if let Some(message) = args.message {
        return run_turn(&agent, &mut conversation, &message).await;
    }

    let mut editor = DefaultEditor::new()?;
    let history_path = config::get_history_path();
    if config::ensure_quill_dir().is_ok() && editor.load_history(&history_path).is_err() {
        info!("no history loaded from {}", history_path.display());
    }

    println!("{}", style("🪶 quill").bold());
    println!(
        "{}\n",
        style(format!(
            "{} · {} · {}  (Ctrl+D to exit)",
            config.provider,
            config.model,
            working_dir.display()
        ))
        .dim()
    );

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(input);

                run_turn(&agent, &mut conversation, input).await?;
                println!();
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                println!("\n👋 Goodbye!");
                break;
            }
            Err(e) => {
                warn!("failed to read input: {}", e);
                break;
            }
        }
    }

    if let Err(e) = editor.save_history(&history_path) {
        warn!("failed to save history to {}: {}", history_path.display(), e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = ChatArgs {
            model: Some("gpt-4o-mini".to_string()),
            max_steps: Some(3),
            ..ChatArgs::default()
        };
        let mut config = config::Config::default();
        args.apply(&mut config);

        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_steps, 3);
        assert_eq!(config.provider, "openai");
    }
}

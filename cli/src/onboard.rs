use anyhow::{Context, Result};
use console::style;
use dialoguer::{Input, Password, Select};
use quill_core::config::{self, Config};

const PROVIDERS: &[(&str, &str, &str)] = &[
    ("openai", "OpenAI", "gpt-4o"),
    ("openrouter", "OpenRouter", "openai/gpt-4o"),
];

fn print_step(step: usize, total: usize, title: &str) {
    println!();
    println!(
        "{}",
        style(format!("[{}/{}] {}", step, total, title))
            .cyan()
            .bold()
    );
    println!();
}

pub fn run_init() -> Result<()> {
    let existing = config::load_config().unwrap_or_default();
    let total = 3;

    println!("{}", style("quill setup").bold());
    if config::config_exists() {
        println!(
            "{}",
            style(format!(
                "Updating {}",
                config::get_config_path().display()
            ))
            .dim()
        );
    }

    print_step(1, total, "Provider");
    let labels: Vec<&str> = PROVIDERS.iter().map(|(_, label, _)| *label).collect();
    let default_idx = PROVIDERS
        .iter()
        .position(|(name, _, _)| *name == existing.provider)
        .unwrap_or(0);
    let choice = Select::new()
        .with_prompt("Completion provider")
        .items(&labels)
        .default(default_idx)
        .interact()
        .context("Provider selection cancelled")?;
    let (provider, _, default_model) = PROVIDERS[choice];

    print_step(2, total, "Model");
    let model_default = if existing.provider == provider {
        existing.model.clone()
    } else {
        default_model.to_string()
    };
    let model: String = Input::new()
        .with_prompt("Model")
        .default(model_default)
        .interact_text()?;
    let base_url: String = Input::new()
        .with_prompt("Base URL (empty for the provider default)")
        .default(existing.base_url.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    print_step(3, total, "API key");
    println!(
        "{}",
        style("Leave empty to read it from the environment or a .env file instead.").dim()
    );
    let api_key = Password::new()
        .with_prompt("API key")
        .allow_empty_password(true)
        .interact()?;

    let config = Config {
        provider: provider.to_string(),
        api_key: if api_key.trim().is_empty() {
            existing.api_key.clone()
        } else {
            api_key.trim().to_string()
        },
        base_url: Some(base_url.trim().to_string()).filter(|u| !u.is_empty()),
        model: model.trim().to_string(),
        ..existing
    };

    let path = config::save_config(&config)?;
    println!();
    println!(
        "{} Saved {}",
        style("✓").green().bold(),
        path.display()
    );
    println!("Run {} to start chatting.", style("quill").bold());

    Ok(())
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const QUILL_DIR: &str = ".quill";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub provider: String,
    /// Fallback used only when no API key is set in the environment.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub max_steps: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            provider: "openai".to_string(),
            api_key: String::new(),
            base_url: None,
            model: "gpt-4o".to_string(),
            temperature: crate::agent::loop_::DEFAULT_TEMPERATURE,
            max_steps: crate::agent::loop_::DEFAULT_MAX_STEPS,
        }
    }
}

impl Config {
    /// Applies `QUILL_PROVIDER`, `QUILL_MODEL` and `QUILL_BASE_URL` on top of
    /// the file values.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(provider) = non_empty("QUILL_PROVIDER") {
            self.provider = provider;
        }
        if let Some(model) = non_empty("QUILL_MODEL") {
            self.model = model;
        }
        if let Some(base_url) = non_empty("QUILL_BASE_URL") {
            self.base_url = Some(base_url);
        }
    }
}

pub fn get_quill_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(QUILL_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_quill_dir().join("config.toml")
}

pub fn get_history_path() -> PathBuf {
    get_quill_dir().join("history.txt")
}

pub fn ensure_quill_dir() -> Result<PathBuf> {
    let quill_dir = get_quill_dir();

    if !quill_dir.exists() {
        std::fs::create_dir_all(&quill_dir).with_context(|| {
            format!("Failed to create quill directory at {}", quill_dir.display())
        })?;
    }

    Ok(quill_dir)
}

pub fn config_exists() -> bool {
    get_config_path().exists()
}

/// Loads `~/.quill/config.toml`, or the defaults when it does not exist.
pub fn load_config() -> Result<Config> {
    let config_path = get_config_path();

    let content = match std::fs::read_to_string(&config_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Failed to read config from {}", config_path.display())
            });
        }
    };

    parse_config(&content)
        .with_context(|| format!("Failed to parse config from {}", config_path.display()))
}

pub fn parse_config(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

pub fn save_config(config: &Config) -> Result<PathBuf> {
    ensure_quill_dir()?;

    let config_path = get_config_path();
    let content =
        toml::to_string_pretty(config).with_context(|| "Failed to serialize config to TOML")?;

    std::fs::write(&config_path, content)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    Ok(config_path)
}

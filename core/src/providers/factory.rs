use crate::config::Config;
use crate::providers::openai::{OPENAI_BASE_URL, OPENROUTER_BASE_URL};
use crate::providers::OpenAIProvider;
use crate::traits::Provider;
use anyhow::{Result, anyhow};
use std::sync::Arc;

const OPENAI_KEY_VARS: &[&str] = &["OPENAI_API_KEY", "QUILL_API_KEY"];
const OPENROUTER_KEY_VARS: &[&str] = &["OPENROUTER_API_KEY", "QUILL_API_KEY"];

pub fn create_provider(config: &Config) -> Result<Arc<dyn Provider>> {
    create_provider_with_env(config, |var| std::env::var(var).ok())
}

pub fn create_provider_with_env(
    config: &Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Arc<dyn Provider>> {
    let provider_name = config.provider.trim().to_lowercase();

    let (key_vars, default_base_url) = match provider_name.as_str() {
        "openai" => (OPENAI_KEY_VARS, OPENAI_BASE_URL),
        "openrouter" => (OPENROUTER_KEY_VARS, OPENROUTER_BASE_URL),
        _ => {
            return Err(anyhow!(
                "Unknown provider: {}. Available: openai, openrouter",
                config.provider
            ));
        }
    };

    let api_key = resolve_api_key_with_fallback(key_vars, &config.api_key, lookup)?;
    let provider = OpenAIProvider::new(api_key)
        .with_name(provider_name)
        .with_model(config.model.clone())
        .with_base_url(config.base_url.as_deref().unwrap_or(default_base_url));

    Ok(Arc::new(provider))
}

fn resolve_api_key_with_fallback(
    env_vars: &[&str],
    config_key: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String> {
    for var_name in env_vars {
        if let Some(key) = lookup(var_name).filter(|k| !k.trim().is_empty()) {
            return Ok(key.trim().to_string());
        }
    }
    if !config_key.trim().is_empty() {
        Ok(config_key.trim().to_string())
    } else {
        Err(anyhow!(
            "No API key found. Set {} in the environment or a .env file, or run 'quill init'",
            env_vars.join(" or ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_key_fails_fast() {
        let err = create_provider_with_env(&Config::default(), no_env)
            .err()
            .unwrap();
        assert!(err.to_string().contains("OPENAI_API_KEY or QUILL_API_KEY"));
    }

    #[test]
    fn env_key_beats_config_key() {
        let key = resolve_api_key_with_fallback(OPENAI_KEY_VARS, "from-config", |var| {
            (var == "QUILL_API_KEY").then(|| "from-env".to_string())
        })
        .unwrap();
        assert_eq!(key, "from-env");
    }

    #[test]
    fn config_key_is_fallback() {
        let key = resolve_api_key_with_fallback(OPENAI_KEY_VARS, "from-config", no_env).unwrap();
        assert_eq!(key, "from-config");
    }

    #[test]
    fn provider_name_is_normalized() {
        let config = Config {
            provider: "OpenRouter".to_string(),
            api_key: "k".to_string(),
            ..Config::default()
        };
        let provider = create_provider_with_env(&config, no_env).unwrap();
        assert_eq!(provider.name(), "openrouter");
        assert_eq!(provider.model(), "gpt-4o");
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let config = Config {
            provider: "glm".to_string(),
            api_key: "k".to_string(),
            ..Config::default()
        };
        let err = create_provider_with_env(&config, no_env).err().unwrap();
        assert!(err.to_string().starts_with("Unknown provider: glm"));
    }
}

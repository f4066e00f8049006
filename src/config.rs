use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const API_URL_ENV: &str = "DASHCHAT_API_URL";
const MODEL_ENV: &str = "DASHCHAT_MODEL";
const TEMPERATURE_ENV: &str = "DASHCHAT_TEMPERATURE";
const MAX_TOKENS_ENV: &str = "DASHCHAT_MAX_TOKENS";

const DEFAULT_API_URL: &str = "http://localhost:8000/chat";
const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = non_empty_env(API_URL_ENV) {
            config.api_url = url;
        }
        if let Some(model) = non_empty_env(MODEL_ENV) {
            config.model = model;
        }
        if let Some(temperature) = parsed_env::<f32>(TEMPERATURE_ENV) {
            config.temperature = temperature.clamp(0.0, 2.0);
        }
        if let Some(max_tokens) = parsed_env::<u32>(MAX_TOKENS_ENV) {
            config.max_tokens = max_tokens.clamp(1, 32_768);
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.api_url)
            .with_context(|| format!("invalid {API_URL_ENV} value: {}", self.api_url))?;

        if !self.api_url.trim_end_matches('/').ends_with("/chat") {
            eprintln!(
                "⚠️  WARNING: endpoint '{}' does not end in /chat; model and health \
                 lookups may not resolve",
                self.api_url
            );
        }

        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parsed_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

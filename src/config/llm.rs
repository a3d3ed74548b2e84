use super::defaults::{DEFAULT_API_ENDPOINT, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use super::{parse_env, EnvLookup, LlmFileConfig};
use crate::error::{ArgoChatError, Result};

/// Connection settings for the LLM completion service.
#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl LlmConfig {
    pub fn resolve(file: &LlmFileConfig, env: EnvLookup<'_>) -> Result<Self> {
        // API key is only ever read from the environment
        let api_key = env("ANTHROPIC_API_KEY").ok_or_else(|| {
            ArgoChatError::Config("ANTHROPIC_API_KEY environment variable not set".to_string())
        })?;

        // Endpoint: env var > config file > default
        let endpoint = env("ANTHROPIC_BASE_URL")
            .or_else(|| file.endpoint.clone())
            .map(|endpoint| normalize_endpoint(&endpoint))
            .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string());

        let model = env("ARGOCHAT_MODEL")
            .or_else(|| file.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let max_tokens = parse_env(env, "ARGOCHAT_MAX_TOKENS")
            .or(file.max_tokens)
            .unwrap_or(DEFAULT_MAX_TOKENS);

        let temperature = file.temperature.unwrap_or(DEFAULT_TEMPERATURE);
        if !(0.0..=1.0).contains(&temperature) {
            return Err(ArgoChatError::Config(format!(
                "llm.temperature must be between 0 and 1, got {}",
                temperature
            )));
        }

        Ok(Self {
            api_key,
            endpoint,
            model,
            max_tokens,
            temperature,
        })
    }
}

/// Accept a bare base URL, a `/v1` URL, or the full messages endpoint.
pub fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim_end_matches('/');
    if trimmed.ends_with("/messages") {
        trimmed.to_string()
    } else if trimmed.ends_with("/v1") {
        format!("{}/messages", trimmed)
    } else {
        format!("{}/v1/messages", trimmed)
    }
}

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

use crate::api::models::{CompletionRequest, CompletionResponse, RequestBody};
use crate::api::response::{extract_error_message, parse_response};
use crate::api::LanguageModel;
use crate::config::LlmConfig;
use crate::error::{ArgoChatError, Result};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Messages API client. One instance is shared for the lifetime of a process.
pub struct AnthropicClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl AnthropicClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&config.api_key)
                .map_err(|e| ArgoChatError::Config(format!("Invalid API key header: {}", e)))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn request_body(&self, request: &CompletionRequest) -> RequestBody {
        RequestBody {
            model: self.model.clone(),
            max_tokens: request.max_tokens.unwrap_or(self.max_tokens),
            temperature: request.temperature.unwrap_or(self.temperature),
            system: request.system.clone(),
            messages: request.messages.clone(),
            tools: request.tools.clone(),
            stop_sequences: request.stop_sequences.clone(),
        }
    }
}

#[async_trait]
impl LanguageModel for AnthropicClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let body = self.request_body(request);

        tracing::debug!(
            model = %body.model,
            messages = body.messages.len(),
            tools = body.tools.len(),
            "calling LLM"
        );

        let response = self.http.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "LLM request failed");
            return Err(ArgoChatError::Api {
                status: status.as_u16(),
                message: extract_error_message(&response_text),
            });
        }

        let parsed = parse_response(&response_text)?;
        if let Some(ref usage) = parsed.usage {
            tracing::debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                stop_reason = parsed.stop_reason.as_deref().unwrap_or("unknown"),
                "LLM response received"
            );
        }
        Ok(parsed)
    }
}

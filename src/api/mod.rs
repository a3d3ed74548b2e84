pub mod client;
pub mod models;
pub mod response;

use async_trait::async_trait;

use crate::error::Result;

pub use client::AnthropicClient;
pub use models::{CompletionRequest, CompletionResponse, RequestBody, Usage};

/// A hosted LLM that produces one assistant turn per call.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;
}

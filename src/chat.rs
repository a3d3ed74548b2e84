use reqwest::{Response, StatusCode};
use std::time::Duration;

use crate::api::response::extract_error_message;
use crate::config::ClientConfig;
use crate::error::{ArgoChatError, Result};
use crate::http::{QueryRequest, QueryResponse, ToolsResponse};
use crate::models::{Message, ToolDescriptor};

/// HTTP client for `argochat-server`.
///
/// Holds the session id handed out by the server and the last authoritative
/// copy of the history; it never edits history itself.
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
    session_id: Option<String>,
    history: Vec<Message>,
}

impl ChatClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.server_url.clone(),
            timeout_secs: config.timeout_secs,
            session_id: None,
            history: Vec::new(),
        })
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub async fn query(&mut self, question: &str) -> Result<QueryResponse> {
        let body = QueryRequest {
            query: question.to_string(),
            session_id: self.session_id.clone(),
        };

        tracing::debug!(session_id = ?self.session_id, "sending query");
        let response = self
            .http
            .post(format!("{}/query", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        if response.status() == StatusCode::NOT_FOUND {
            if let Some(id) = self.session_id.take() {
                // The server forgot us (expiry or restart); the next query starts fresh.
                self.history.clear();
                return Err(ArgoChatError::SessionNotFound(id));
            }
        }

        let response = self.check_status(response).await?;
        let parsed: QueryResponse = response.json().await.map_err(|e| self.send_error(e))?;
        self.session_id = Some(parsed.session_id.clone());
        self.history = parsed.messages.clone();
        Ok(parsed)
    }

    pub async fn tools(&self) -> Result<Vec<ToolDescriptor>> {
        let response = self
            .http
            .get(format!("{}/tools", self.base_url))
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        let response = self.check_status(response).await?;
        let parsed: ToolsResponse = response.json().await.map_err(|e| self.send_error(e))?;
        Ok(parsed.tools)
    }

    /// Drop the server-side session, if any, and forget the local history.
    pub async fn end_session(&mut self) -> Result<()> {
        self.history.clear();
        let Some(id) = self.session_id.take() else {
            return Ok(());
        };
        let response = self
            .http
            .delete(format!("{}/sessions/{}", self.base_url, id))
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        self.check_status(response).await.map(|_| ())
    }

    async fn check_status(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ArgoChatError::Api {
            status: status.as_u16(),
            message: extract_error_message(&body),
        })
    }

    fn send_error(&self, e: reqwest::Error) -> ArgoChatError {
        if e.is_timeout() {
            ArgoChatError::Timeout(self.timeout_secs)
        } else {
            ArgoChatError::Network(e)
        }
    }
}

use regex::{Captures, Regex};
use std::sync::{Arc, LazyLock};

use crate::api::response::extract_text;
use crate::api::{CompletionRequest, LanguageModel};
use crate::database::DatabaseGateway;
use crate::error::{ArgoChatError, Result};
use crate::models::Message;

pub const SQL_PROMPT_TEMPLATE: &str = "\nBased on the table schema below, write a SQL query that would answer the user's question.\n{schema}\n\nQuestion: {question}\nSQL Query\n";

pub const SQL_STOP_SEQUENCE: &str = "\nSQL Result:";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(schema|question)\}").expect("placeholder pattern is a valid regex"));

/// Fill both placeholders in one pass; braces inside the substituted text stay as they are.
pub fn render_prompt(schema: &str, question: &str) -> String {
    PLACEHOLDER
        .replace_all(SQL_PROMPT_TEMPLATE, |caps: &Captures| match &caps[1] {
            "schema" => schema.to_string(),
            _ => question.to_string(),
        })
        .into_owned()
}

/// Turns a natural-language question into SQL with a single completion call.
///
/// The returned text is not validated; a bad query only shows up when the
/// gateway executes it.
pub struct QueryCompiler {
    model: Arc<dyn LanguageModel>,
    gateway: Arc<DatabaseGateway>,
}

impl QueryCompiler {
    pub fn new(model: Arc<dyn LanguageModel>, gateway: Arc<DatabaseGateway>) -> Self {
        Self { model, gateway }
    }

    pub async fn get_sql_query(&self, question: &str) -> Result<String> {
        let gateway = Arc::clone(&self.gateway);
        let schema = tokio::task::spawn_blocking(move || gateway.schema_text())
            .await
            .map_err(|e| ArgoChatError::Tool(format!("schema lookup did not complete: {}", e)))??;
        let request = CompletionRequest {
            messages: vec![Message::user_text(render_prompt(&schema, question))],
            temperature: Some(0.0),
            stop_sequences: vec![SQL_STOP_SEQUENCE.to_string()],
            ..Default::default()
        };

        let response = self.model.complete(&request).await?;
        let sql = extract_text(&response.content);
        tracing::debug!(question, sql = %sql, "compiled question to SQL");
        Ok(sql)
    }
}

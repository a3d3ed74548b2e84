use std::sync::Arc;

use crate::api::response::{extract_text, has_tool_use};
use crate::api::{CompletionRequest, LanguageModel};
use crate::config::defaults::DEFAULT_MAX_ITERATIONS;
use crate::error::Result;
use crate::models::{ContentBlock, Message, Role, ToolDescriptor};
use crate::tools::ToolInvoker;

pub const INCOMPLETE_ANSWER: &str =
    "I could not finish answering within the allowed number of steps. \
     Try asking a narrower question.";

#[derive(Debug, Clone)]
pub struct LoopSettings {
    /// Upper bound on LLM calls for a single query.
    pub max_iterations: usize,
    pub system_prompt: Option<String>,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            system_prompt: None,
        }
    }
}

/// Everything a query needs besides its history. Built once per server.
pub struct OrchestratorContext {
    pub model: Arc<dyn LanguageModel>,
    pub tools: Arc<dyn ToolInvoker>,
    pub tool_descriptors: Vec<ToolDescriptor>,
    pub settings: LoopSettings,
}

impl OrchestratorContext {
    /// Fetch the tool declarations once; they stay fixed for the context's lifetime.
    pub async fn new(
        model: Arc<dyn LanguageModel>,
        tools: Arc<dyn ToolInvoker>,
        settings: LoopSettings,
    ) -> Result<Self> {
        let tool_descriptors = tools.list_tools().await?;
        tracing::info!(
            tools = ?tool_descriptors.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            "tool declarations loaded"
        );
        Ok(Self {
            model,
            tools,
            tool_descriptors,
            settings,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    Complete { iterations: usize },
    Incomplete { iterations: usize },
}

impl LoopOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, LoopOutcome::Complete { .. })
    }

    pub fn status(&self) -> &'static str {
        match self {
            LoopOutcome::Complete { .. } => "complete",
            LoopOutcome::Incomplete { .. } => "incomplete",
        }
    }

    pub fn iterations(&self) -> usize {
        match self {
            LoopOutcome::Complete { iterations } | LoopOutcome::Incomplete { iterations } => {
                *iterations
            }
        }
    }
}

/// Answer `query` against `history`, calling tools as the model asks for them.
///
/// On success the history ends with a plain-text assistant message. On error,
/// or when the returned future is dropped before it finishes, `history` is left
/// exactly as it was: turns accumulate on a working copy that is only committed
/// once the query completes.
pub async fn run(
    context: &OrchestratorContext,
    history: &mut Vec<Message>,
    query: &str,
) -> Result<LoopOutcome> {
    let mut working = history.clone();
    match run_turns(context, &mut working, query).await {
        Ok(outcome) => {
            *history = working;
            Ok(outcome)
        }
        Err(e) => {
            tracing::warn!(error = %e, kind = ?e.kind(), "query failed, history left unchanged");
            Err(e)
        }
    }
}

async fn run_turns(
    context: &OrchestratorContext,
    history: &mut Vec<Message>,
    query: &str,
) -> Result<LoopOutcome> {
    history.push(Message::user_text(query));

    for iteration in 1..=context.settings.max_iterations {
        let request = CompletionRequest {
            system: context.settings.system_prompt.clone(),
            messages: history.clone(),
            tools: context.tool_descriptors.clone(),
            ..Default::default()
        };

        tracing::debug!(iteration, messages = history.len(), "calling model");
        let response = context.model.complete(&request).await?;

        if !has_tool_use(&response.content) {
            history.push(Message::assistant_text(extract_text(&response.content)));
            tracing::info!(iterations = iteration, "query answered");
            return Ok(LoopOutcome::Complete {
                iterations: iteration,
            });
        }

        let assistant = Message::blocks(Role::Assistant, response.content);
        let results = dispatch_tools(context, &assistant).await?;
        history.push(assistant);
        history.push(Message::blocks(Role::User, results));
    }

    tracing::warn!(
        max_iterations = context.settings.max_iterations,
        "iteration limit reached without a final answer"
    );
    history.push(Message::assistant_text(INCOMPLETE_ANSWER));
    Ok(LoopOutcome::Incomplete {
        iterations: context.settings.max_iterations,
    })
}

/// One tool_result per tool_use, in the order the model asked.
async fn dispatch_tools(
    context: &OrchestratorContext,
    assistant: &Message,
) -> Result<Vec<ContentBlock>> {
    let mut results = Vec::new();
    for (id, name, input) in assistant.tool_uses() {
        tracing::info!(tool = name, id, "calling tool");
        let output = context.tools.call_tool(name, input).await?;
        if output.is_error {
            tracing::info!(tool = name, "tool reported an error");
        }
        results.push(ContentBlock::ToolResult {
            tool_use_id: id.to_string(),
            content: output.text(),
            is_error: output.is_error,
        });
    }
    Ok(results)
}

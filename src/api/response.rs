use crate::api::models::CompletionResponse;
use crate::error::{ArgoChatError, Result};
use crate::models::ContentBlock;
use serde_json::Value;

/// Parse a non-streaming Messages API response body
pub fn parse_response(response_text: &str) -> Result<CompletionResponse> {
    serde_json::from_str(response_text)
        .map_err(|e| ArgoChatError::MalformedResponse(format!("{}: {}", e, preview(response_text))))
}

/// Extract the human-readable message from an error body (`{"error": {"message"}}` or
/// `{"error": "..."}`), falling back to the raw text
pub fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| match v.get("error")? {
            Value::String(message) => Some(message.clone()),
            error => error
                .get("message")
                .and_then(|m| m.as_str())
                .map(|s| s.to_string()),
        })
        .unwrap_or_else(|| body.to_string())
}

/// Concatenate the text blocks of a turn, separated by blank lines
pub fn extract_text(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn has_tool_use(blocks: &[ContentBlock]) -> bool {
    blocks
        .iter()
        .any(|block| matches!(block, ContentBlock::ToolUse { .. }))
}

fn preview(text: &str) -> String {
    if text.chars().count() > 200 {
        format!("{}...", text.chars().take(200).collect::<String>())
    } else {
        text.to_string()
    }
}

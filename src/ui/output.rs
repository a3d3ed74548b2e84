use colored::*;

use crate::models::{Message, Role, ToolDescriptor};
use crate::ui::highlight::CodeHighlighter;

/// Terminal text for one message, or `None` when it is not shown to users.
///
/// Only plain-text messages are rendered; tool calls and tool results stay hidden.
pub fn format_message(message: &Message, highlighter: &CodeHighlighter) -> Option<String> {
    let text = message.text()?;
    let formatted = match message.role {
        Role::User => format!("{} {}", "You:".green().bold(), text),
        Role::Assistant => format!(
            "{}\n{}",
            "Assistant:".cyan().bold(),
            highlighter.render(text).trim_end()
        ),
    };
    Some(formatted)
}

/// Print the visible messages of a history slice.
pub fn render_messages(messages: &[Message], highlighter: &CodeHighlighter, include_user: bool) {
    for message in messages {
        if !include_user && message.role == Role::User {
            continue;
        }
        if let Some(formatted) = format_message(message, highlighter) {
            println!("{}\n", formatted);
        }
    }
}

pub fn display_tools(tools: &[ToolDescriptor]) {
    println!("{}", format!("Available tools: {}", tools.len()).cyan());
    for tool in tools {
        println!("  {} {}", tool.name.bold(), tool.description.dimmed());
    }
}

pub fn display_error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentBlock;
    use serde_json::json;

    #[test]
    fn test_block_messages_are_hidden() {
        colored::control::set_override(false);
        let highlighter = CodeHighlighter::new();

        let tool_call = Message::blocks(
            Role::Assistant,
            vec![ContentBlock::ToolUse {
                id: "toolu_01".into(),
                name: "get_schema".into(),
                input: json!({}),
            }],
        );
        assert!(format_message(&tool_call, &highlighter).is_none());

        let answer = Message::assistant_text("There are 12 floats.");
        assert_eq!(
            format_message(&answer, &highlighter).unwrap(),
            "Assistant:\nThere are 12 floats."
        );

        let question = Message::user_text("How many floats?");
        assert_eq!(
            format_message(&question, &highlighter).unwrap(),
            "You: How many floats?"
        );
    }
}

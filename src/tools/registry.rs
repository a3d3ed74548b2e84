use async_trait::async_trait;
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

use super::ToolInvoker;
use crate::error::{ArgoChatError, Result};
use crate::models::{ToolDescriptor, ToolOutput};

pub type ToolHandler = Box<
    dyn for<'a> Fn(&'a Value) -> Pin<Box<dyn Future<Output = std::result::Result<String, String>> + Send + 'a>>
        + Send
        + Sync,
>;

pub struct RegisteredTool {
    pub descriptor: ToolDescriptor,
    pub handler: ToolHandler,
}

/// Ordered set of tools. Listing order is registration order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: ToolDescriptor, handler: ToolHandler) -> Result<()> {
        if self.get(&descriptor.name).is_some() {
            return Err(ArgoChatError::Config(format!(
                "tool '{}' is already registered",
                descriptor.name
            )));
        }
        JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&descriptor.input_schema)
            .map_err(|e| {
                ArgoChatError::Config(format!("invalid schema for tool '{}': {}", descriptor.name, e))
            })?;

        self.tools.push(RegisteredTool { descriptor, handler });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|t| t.descriptor.name == name)
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn validate_arguments(&self, tool_name: &str, arguments: &Value) -> std::result::Result<(), String> {
        let tool = self
            .get(tool_name)
            .ok_or_else(|| format!("Tool '{}' not found", tool_name))?;

        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&tool.descriptor.input_schema)
            .map_err(|e| format!("Invalid tool schema: {}", e))?;

        if let Err(errors) = schema.validate(arguments) {
            let error_messages: Vec<String> = errors
                .map(|e| format!("{}: {}", e.instance_path, e))
                .collect();
            return Err(error_messages.join("; "));
        }

        Ok(())
    }

    /// Run a tool. Every failure is folded into an error output.
    pub async fn dispatch(&self, name: &str, arguments: &Value) -> ToolOutput {
        let Some(tool) = self.get(name) else {
            tracing::warn!(tool = name, "call to unknown tool");
            return ToolOutput::error(format!("Tool '{}' not found", name));
        };

        if let Err(e) = self.validate_arguments(name, arguments) {
            tracing::info!(tool = name, error = %e, "tool arguments rejected");
            return ToolOutput::error(format!(
                "Tool '{}' argument validation failed: {}",
                name, e
            ));
        }

        tracing::debug!(tool = name, "running tool");
        match (tool.handler)(arguments).await {
            Ok(text) => ToolOutput::success(text),
            Err(message) => {
                tracing::info!(tool = name, error = %message, "tool failed");
                ToolOutput::error(message)
            }
        }
    }
}

#[async_trait]
impl ToolInvoker for ToolRegistry {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        Ok(self.descriptors())
    }

    async fn call_tool(&self, name: &str, arguments: &Value) -> Result<ToolOutput> {
        Ok(self.dispatch(name, arguments).await)
    }
}

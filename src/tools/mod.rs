mod builtins;
mod registry;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::{ToolDescriptor, ToolOutput};

pub use builtins::{GET_SCHEMA, GET_SQL_QUERY, GET_SQL_RESPONSE};
pub use registry::{RegisteredTool, ToolHandler, ToolRegistry};

/// Anything the conversation loop can list and call tools on.
///
/// `Err` means the channel itself failed. A tool that ran and failed reports
/// through `ToolOutput::is_error` instead.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>>;
    async fn call_tool(&self, name: &str, arguments: &Value) -> Result<ToolOutput>;
}

mod message;
mod tool;

pub use message::{ContentBlock, Message, MessageContent, Role};
pub use tool::{ToolContent, ToolDescriptor, ToolOutput};

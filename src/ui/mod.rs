pub mod highlight;
pub mod output;

pub use highlight::CodeHighlighter;
pub use output::{display_error, display_tools, format_message, render_messages};

mod gateway;
mod render;

pub use gateway::{DatabaseGateway, QueryResult, MAX_RESULT_CHARS, MAX_RESULT_ROWS};
pub use render::{render_rows, render_rows_within, render_sample_block, SqlValue};

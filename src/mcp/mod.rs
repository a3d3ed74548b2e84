pub mod client;
pub mod server;
pub mod types;

pub use client::TransportSession;
pub use server::{handle_line, serve};

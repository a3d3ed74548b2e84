pub mod api;
pub mod chat;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod database;
pub mod error;
pub mod http;
pub mod logging;
pub mod mcp;
pub mod models;
pub mod orchestrator;
pub mod session;
pub mod tools;
pub mod ui;

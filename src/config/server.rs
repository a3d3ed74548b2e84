use std::collections::HashMap;

use super::defaults::{
    DEFAULT_HOST, DEFAULT_MAX_ITERATIONS, DEFAULT_PORT, DEFAULT_SESSION_EXPIRY_MINUTES,
    DEFAULT_TOOL_TIMEOUT_SECS, TOOL_HOST_BINARY,
};
use super::{
    expand_with, parse_env, process_env, DatabaseConfig, EnvLookup, FileConfig, LlmConfig,
};
use crate::cli::{ServerArgs, ToolHostArgs};
use crate::error::{ArgoChatError, Result};

/// How the server starts the tool host process.
#[derive(Debug, Clone)]
pub struct ToolHostLaunch {
    pub command: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub llm: LlmConfig,
    pub host: String,
    pub port: u16,
    pub max_iterations: usize,
    pub system_prompt: Option<String>,
    pub session_expiry_minutes: i64,
    pub tool_host: ToolHostLaunch,
    pub verbose: bool,
}

impl ServerConfig {
    pub fn from_env_and_args(args: &ServerArgs) -> Result<Self> {
        let file = FileConfig::load(args.config.as_deref())
            .map_err(|e| ArgoChatError::Config(format!("{:#}", e)))?;
        Self::resolve(args, &file, &process_env)
    }

    /// CLI args > env vars > config file > defaults
    pub fn resolve(args: &ServerArgs, file: &FileConfig, env: EnvLookup<'_>) -> Result<Self> {
        let llm = LlmConfig::resolve(&file.llm, env)?;

        let host = args
            .host
            .clone()
            .or_else(|| env("ARGOCHAT_HOST"))
            .or_else(|| file.server.host.clone())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = args
            .port
            .or_else(|| parse_env(env, "ARGOCHAT_PORT"))
            .or(file.server.port)
            .unwrap_or(DEFAULT_PORT);

        let max_iterations = args
            .max_iterations
            .or_else(|| parse_env(env, "ARGOCHAT_MAX_ITERATIONS"))
            .or(file.server.max_iterations)
            .unwrap_or(DEFAULT_MAX_ITERATIONS);
        if max_iterations == 0 {
            return Err(ArgoChatError::Config(
                "max_iterations must be at least 1".to_string(),
            ));
        }

        let system_prompt =
            env("ARGOCHAT_SYSTEM_PROMPT").or_else(|| file.server.system_prompt.clone());

        let session_expiry_minutes = file
            .server
            .session_expiry_minutes
            .unwrap_or(DEFAULT_SESSION_EXPIRY_MINUTES);

        let command = match args
            .tool_host
            .clone()
            .or_else(|| env("ARGOCHAT_TOOL_HOST"))
            .or_else(|| file.tool_host.command.clone())
        {
            Some(command) => command,
            None => default_tool_host_command()?,
        };

        let tool_env = file
            .tool_host
            .env
            .iter()
            .map(|(key, value)| (key.clone(), expand_with(value, env)))
            .collect();

        let timeout_secs = parse_env(env, "ARGOCHAT_TOOL_TIMEOUT")
            .or(file.tool_host.timeout_secs)
            .unwrap_or(DEFAULT_TOOL_TIMEOUT_SECS);

        Ok(Self {
            llm,
            host,
            port,
            max_iterations,
            system_prompt,
            session_expiry_minutes,
            tool_host: ToolHostLaunch {
                command,
                args: file.tool_host.args.clone(),
                env: tool_env,
                timeout_secs,
            },
            verbose: file.verbose(args.verbose, env),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `argochat-tools` installed next to the running executable.
fn default_tool_host_command() -> Result<String> {
    let exe = std::env::current_exe()?;
    let candidate = exe.with_file_name(TOOL_HOST_BINARY);
    Ok(candidate.to_string_lossy().into_owned())
}

/// Everything the tool host process needs: the store and the model for SQL generation.
#[derive(Debug, Clone)]
pub struct ToolHostConfig {
    pub llm: LlmConfig,
    pub database: DatabaseConfig,
    pub verbose: bool,
}

impl ToolHostConfig {
    pub fn from_env_and_args(args: &ToolHostArgs) -> Result<Self> {
        let file = FileConfig::load(args.config.as_deref())
            .map_err(|e| ArgoChatError::Config(format!("{:#}", e)))?;
        Self::resolve(args, &file, &process_env)
    }

    pub fn resolve(args: &ToolHostArgs, file: &FileConfig, env: EnvLookup<'_>) -> Result<Self> {
        let database = DatabaseConfig::resolve(args.database.clone(), &file.database, env)?;
        let llm = LlmConfig::resolve(&file.llm, env)?;
        Ok(Self {
            llm,
            database,
            verbose: file.verbose(args.verbose, env),
        })
    }
}

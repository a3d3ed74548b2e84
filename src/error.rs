use thiserror::Error;

/// Coarse classification of failures so callers can branch without matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    /// Tool channel unavailable or misbehaving. Fatal to the current query.
    Transport,
    /// A query or tool failed while executing.
    Execution,
    /// The LLM service rejected the request or answered with something unusable.
    Model,
    Session,
    Internal,
}

#[derive(Debug, Error)]
pub enum ArgoChatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Tool host returned error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Session '{0}' not found")]
    SessionNotFound(String),

    #[error("Session '{0}' is already processing a query")]
    SessionBusy(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ArgoChatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArgoChatError::Config(_) => ErrorKind::Config,
            ArgoChatError::Transport(_) | ArgoChatError::Rpc { .. } | ArgoChatError::Timeout(_) => {
                ErrorKind::Transport
            }
            ArgoChatError::Tool(_) | ArgoChatError::Database(_) => ErrorKind::Execution,
            ArgoChatError::Api { .. }
            | ArgoChatError::MalformedResponse(_)
            | ArgoChatError::Network(_) => ErrorKind::Model,
            ArgoChatError::SessionNotFound(_) | ArgoChatError::SessionBusy(_) => ErrorKind::Session,
            ArgoChatError::Io(_) | ArgoChatError::Json(_) | ArgoChatError::Yaml(_) => {
                ErrorKind::Internal
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ArgoChatError>;

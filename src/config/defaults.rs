pub const DEFAULT_API_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-20241022";
pub const DEFAULT_MAX_TOKENS: u32 = 3000;
pub const DEFAULT_TEMPERATURE: f32 = 0.0;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MAX_ITERATIONS: usize = 10;
pub const DEFAULT_SESSION_EXPIRY_MINUTES: i64 = 30;

pub const TOOL_HOST_BINARY: &str = "argochat-tools";
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_CLIENT_TIMEOUT_SECS: u64 = 60;

pub fn default_sample_rows() -> usize {
    3
}


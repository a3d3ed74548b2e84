use super::defaults::{DEFAULT_CLIENT_TIMEOUT_SECS, DEFAULT_SERVER_URL};
use super::{parse_env, process_env, EnvLookup, FileConfig};
use crate::cli::ChatArgs;
use crate::error::{ArgoChatError, Result};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn from_env_and_args(args: &ChatArgs) -> Result<Self> {
        let file = FileConfig::load(args.config.as_deref())
            .map_err(|e| ArgoChatError::Config(format!("{:#}", e)))?;
        Self::resolve(args, &file, &process_env)
    }

    pub fn resolve(args: &ChatArgs, file: &FileConfig, env: EnvLookup<'_>) -> Result<Self> {
        let server_url = args
            .server_url
            .clone()
            .or_else(|| env("ARGOCHAT_SERVER_URL"))
            .or_else(|| file.client.server_url.clone())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        if !server_url.starts_with("http://") && !server_url.starts_with("https://") {
            return Err(ArgoChatError::Config(format!(
                "server URL must start with http:// or https://, got '{}'",
                server_url
            )));
        }

        let timeout_secs = args
            .timeout
            .or_else(|| parse_env(env, "ARGOCHAT_CLIENT_TIMEOUT"))
            .or(file.client.timeout_secs)
            .unwrap_or(DEFAULT_CLIENT_TIMEOUT_SECS);

        Ok(Self {
            server_url,
            timeout_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_client_defaults() {
        let config =
            ClientConfig::resolve(&ChatArgs::default(), &FileConfig::default(), &no_env).unwrap();
        assert_eq!(config.server_url, "http://127.0.0.1:8000");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_client_rejects_bad_url() {
        let args = ChatArgs {
            server_url: Some("localhost:8000".into()),
            ..Default::default()
        };
        assert!(ClientConfig::resolve(&args, &FileConfig::default(), &no_env).is_err());
    }
}

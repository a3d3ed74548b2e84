use std::path::PathBuf;

use super::defaults::default_sample_rows;
use super::{DatabaseFileConfig, EnvLookup};
use crate::error::{ArgoChatError, Result};

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    /// Example rows rendered under each table in the schema text.
    pub sample_rows: usize,
}

impl DatabaseConfig {
    /// Database path: CLI arg > env var > config file. There is no default.
    pub fn resolve(
        cli_path: Option<PathBuf>,
        file: &DatabaseFileConfig,
        env: EnvLookup<'_>,
    ) -> Result<Self> {
        let path = cli_path
            .or_else(|| env("ARGO_DATABASE_PATH").map(PathBuf::from))
            .or_else(|| file.path.clone().map(PathBuf::from))
            .ok_or_else(|| {
                ArgoChatError::Config(
                    "database path not set (use --database, ARGO_DATABASE_PATH or database.path)"
                        .to_string(),
                )
            })?;

        if !path.exists() {
            return Err(ArgoChatError::Config(format!(
                "database file does not exist: {}",
                path.display()
            )));
        }

        Ok(Self {
            path,
            sample_rows: file.sample_rows.unwrap_or_else(default_sample_rows),
        })
    }
}

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use argochat::api::{AnthropicClient, LanguageModel};
use argochat::cli::ToolHostArgs;
use argochat::compiler::QueryCompiler;
use argochat::config::ToolHostConfig;
use argochat::database::DatabaseGateway;
use argochat::logging;
use argochat::mcp::serve;
use argochat::tools::ToolRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    let args = ToolHostArgs::parse();
    let config = ToolHostConfig::from_env_and_args(&args)?;
    logging::init(config.verbose);

    let gateway = Arc::new(
        DatabaseGateway::open(&config.database).with_context(|| {
            format!("failed to open database {}", config.database.path.display())
        })?,
    );
    let model: Arc<dyn LanguageModel> = Arc::new(AnthropicClient::new(&config.llm)?);
    let compiler = Arc::new(QueryCompiler::new(model, Arc::clone(&gateway)));
    let registry = ToolRegistry::argo(gateway, compiler)?;

    tracing::info!(
        tools = registry.len(),
        model = %config.llm.model,
        "tool host ready on stdio"
    );
    serve(&registry, tokio::io::stdin(), tokio::io::stdout()).await?;
    Ok(())
}

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::time::{interval, Duration};

use argochat::api::{AnthropicClient, LanguageModel};
use argochat::cli::ServerArgs;
use argochat::config::ServerConfig;
use argochat::http::{router, AppState};
use argochat::logging;
use argochat::mcp::TransportSession;
use argochat::orchestrator::{LoopSettings, OrchestratorContext};
use argochat::session::{InMemorySessionStore, SessionStore};
use argochat::tools::ToolInvoker;

const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();
    let config = ServerConfig::from_env_and_args(&args)?;
    logging::init(config.verbose);

    let model: Arc<dyn LanguageModel> = Arc::new(AnthropicClient::new(&config.llm)?);
    let transport = Arc::new(
        TransportSession::spawn(&config.tool_host)
            .await
            .context("failed to start the tool host")?,
    );

    let tools: Arc<dyn ToolInvoker> = transport.clone();
    let result = serve_http(&config, model, tools).await;

    // The tool host goes down with us on every path, including startup failures.
    if let Err(e) = transport.close().await {
        tracing::warn!(error = %e, "tool host did not shut down cleanly");
    }
    result
}

async fn serve_http(
    config: &ServerConfig,
    model: Arc<dyn LanguageModel>,
    tools: Arc<dyn ToolInvoker>,
) -> Result<()> {
    let settings = LoopSettings {
        max_iterations: config.max_iterations,
        system_prompt: config.system_prompt.clone(),
    };
    let context = OrchestratorContext::new(model, tools, settings)
        .await
        .context("failed to list tools from the tool host")?;

    let sessions: Arc<dyn SessionStore> =
        Arc::new(InMemorySessionStore::new(config.session_expiry_minutes));
    let purge_store = Arc::clone(&sessions);
    let purger = tokio::spawn(async move {
        let mut ticker = interval(PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            purge_store.purge_expired();
        }
    });

    let state = AppState {
        context: Arc::new(context),
        sessions,
    };

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    tracing::info!(
        address = %address,
        model = %config.llm.model,
        max_iterations = config.max_iterations,
        "argochat-server listening"
    );

    let served = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;
    purger.abort();
    served.context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

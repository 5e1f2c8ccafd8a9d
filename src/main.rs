// src/main.rs

use monad_mcp_server::{
    blockchain::EvmClient,
    build_server,
    config::Config,
    mcp::transport::{run_stdio, TransportOptions},
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // stdout carries protocol frames only, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "monad_mcp_server=info,monad_mcp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("❌ Failed to load configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let client = match EvmClient::connect(config.chain.clone(), config.verify_chain_id).await {
        Ok(client) => client,
        Err(e) => {
            error!("❌ Failed to initialize EVM client: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let server = match build_server(&config, Arc::new(client)) {
        Ok(server) => server,
        Err(e) => {
            error!("❌ Failed to register tools: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for tool in server.dispatcher().registry().list() {
        info!("Tool available: {} - {}", tool.name(), tool.description());
    }
    info!("{} MCP Server running on stdio", config.chain.name);

    let options = TransportOptions {
        write_retry_limit: config.write_retry_limit,
        ..TransportOptions::default()
    };

    match run_stdio(&server, &options).await {
        Ok(summary) => {
            info!(
                "MCP server shutting down ({} frames read, {} responses written)",
                summary.frames_read, summary.responses_written
            );
            ExitCode::SUCCESS
        }
        Err(e) if e.summary.handshake_complete => {
            error!("Transport failed after handshake: {}", e);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Fatal transport error before handshake: {}", e);
            ExitCode::FAILURE
        }
    }
}

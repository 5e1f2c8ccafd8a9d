// src/lib.rs

use std::sync::Arc;

pub mod blockchain;
pub mod config;
pub mod mcp;
pub mod tools;
pub mod utils;

use blockchain::ChainReader;
use config::Config;
use mcp::{
    dispatcher::Dispatcher,
    handler::{McpServer, ServerInfo},
    invoker::HandlerInvoker,
    registry::{RegistryError, ToolRegistry},
};

/// Builds the server with every chain tool registered against `reader`.
///
/// The registry is sealed here: nothing can be registered once serving starts.
pub fn build_server(
    config: &Config,
    reader: Arc<dyn ChainReader>,
) -> Result<McpServer, RegistryError> {
    let mut registry = ToolRegistry::new();
    tools::register_chain_tools(&mut registry, reader, config.chain.clone())?;

    let info = ServerInfo {
        name: config.server_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        instructions: format!(
            "Read-only {} data: native balances, blocks, transactions and gas price.",
            config.chain.name
        ),
    };
    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        HandlerInvoker::new(config.handler_timeout),
    );
    Ok(McpServer::new(info, dispatcher))
}

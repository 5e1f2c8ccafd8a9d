// src/mcp/dispatcher.rs

use crate::mcp::{
    invoker::HandlerInvoker,
    protocol::{ToolCall, ToolResponse},
    registry::ToolRegistry,
    schema,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Routes a [`ToolCall`] to its handler. Every path returns a [`ToolResponse`].
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    invoker: HandlerInvoker,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>, invoker: HandlerInvoker) -> Self {
        Self { registry, invoker }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub async fn dispatch(&self, call: ToolCall) -> ToolResponse {
        info!("Dispatching tool call: {}", call.name);

        let definition = match self.registry.lookup(&call.name) {
            Ok(definition) => definition,
            Err(_) => {
                warn!("Unknown tool requested: {}", call.name);
                return ToolResponse::failure(call.id, format!("Unknown tool: {}", call.name));
            }
        };

        let args = match schema::validate(definition.schema(), &call.arguments) {
            Ok(args) => args,
            Err(e) => {
                warn!("Rejected arguments for '{}': {}", call.name, e);
                return ToolResponse::failure(
                    call.id,
                    format!("Invalid arguments for tool '{}': {}", call.name, e),
                );
            }
        };

        self.invoker.invoke(call.id, definition, args).await
    }
}

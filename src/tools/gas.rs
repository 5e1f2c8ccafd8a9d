use crate::{
    blockchain::{models::ChainInfo, ChainReader},
    mcp::{
        protocol::ContentBlock,
        registry::{ToolDefinition, ToolResult},
        schema::ParameterSchema,
    },
    utils::format_gwei,
};
use std::sync::Arc;

pub const NAME: &str = "get-gas-price";

pub fn tool(reader: Arc<dyn ChainReader>, chain: Arc<ChainInfo>) -> ToolDefinition {
    let description = format!("Get the current gas price on {}", chain.name);

    ToolDefinition::new(
        NAME,
        description,
        ParameterSchema::new(),
        "retrieve gas price",
        move |_| {
            let reader = reader.clone();
            let chain = chain.clone();
            async move { get_gas_price(reader.as_ref(), &chain).await }
        },
    )
}

async fn get_gas_price(reader: &dyn ChainReader, chain: &ChainInfo) -> ToolResult {
    let wei = reader.gas_price().await?;
    Ok(vec![ContentBlock::text(format!(
        "Current gas price on {}: {} gwei ({} wei)",
        chain.name,
        format_gwei(wei),
        wei
    ))])
}

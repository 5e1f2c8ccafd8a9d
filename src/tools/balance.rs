use super::required_str;
use crate::{
    blockchain::{models::ChainInfo, ChainReader},
    mcp::{
        protocol::ContentBlock,
        registry::{ToolDefinition, ToolResult},
        schema::{Constraint, ParamKind, ParamSpec, ParameterSchema, ValidatedArgs},
    },
    utils::format_units,
};
use std::sync::Arc;

pub const NAME: &str = "get-balance";

pub fn tool(reader: Arc<dyn ChainReader>, chain: Arc<ChainInfo>) -> ToolDefinition {
    let schema = ParameterSchema::new().field(
        "address",
        ParamSpec::required(ParamKind::String)
            .describe(format!("{} address to check balance for", chain.name))
            .constrain(Constraint::Prefix("0x")),
    );
    let description = format!("Get {} balance for an address on {}", chain.symbol, chain.name);

    ToolDefinition::new(NAME, description, schema, "retrieve balance", move |args| {
        let reader = reader.clone();
        let chain = chain.clone();
        async move { get_balance(reader.as_ref(), &chain, args).await }
    })
    .with_operation_label(|args| {
        format!(
            "retrieve balance for address: {}",
            args.str("address").unwrap_or("<missing>")
        )
    })
}

async fn get_balance(
    reader: &dyn ChainReader,
    chain: &ChainInfo,
    args: ValidatedArgs,
) -> ToolResult {
    let address = required_str(&args, "address")?;
    let balance = reader.balance(&address).await?;
    Ok(vec![ContentBlock::text(format!(
        "Balance for {}: {} {}",
        address,
        format_units(balance, chain.decimals),
        chain.symbol
    ))])
}

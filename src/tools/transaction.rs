use super::required_str;
use crate::{
    blockchain::{
        models::{ChainInfo, TransactionSummary},
        ChainReader,
    },
    mcp::{
        protocol::ContentBlock,
        registry::{ToolDefinition, ToolResult},
        schema::{Constraint, ParamKind, ParamSpec, ParameterSchema, ValidatedArgs},
    },
    utils::{format_gwei, format_units},
};
use anyhow::anyhow;
use std::fmt::Write;
use std::sync::Arc;

pub const NAME: &str = "get-transaction";

pub fn tool(reader: Arc<dyn ChainReader>, chain: Arc<ChainInfo>) -> ToolDefinition {
    let schema = ParameterSchema::new().field(
        "hash",
        ParamSpec::required(ParamKind::String)
            .describe("0x-prefixed 32-byte transaction hash")
            .constrain(Constraint::Prefix("0x"))
            .constrain(Constraint::MinLength(66)),
    );
    let description = format!("Get details of a transaction on {} by its hash", chain.name);

    ToolDefinition::new(NAME, description, schema, "retrieve transaction", move |args| {
        let reader = reader.clone();
        let chain = chain.clone();
        async move { get_transaction(reader.as_ref(), &chain, args).await }
    })
    .with_operation_label(|args| {
        format!("retrieve transaction {}", args.str("hash").unwrap_or("<missing>"))
    })
}

async fn get_transaction(
    reader: &dyn ChainReader,
    chain: &ChainInfo,
    args: ValidatedArgs,
) -> ToolResult {
    let hash = required_str(&args, "hash")?;
    let tx = reader
        .transaction(&hash)
        .await?
        .ok_or_else(|| anyhow!("transaction {} not found", hash))?;
    Ok(vec![ContentBlock::text(render(&tx, chain))])
}

fn render(tx: &TransactionSummary, chain: &ChainInfo) -> String {
    let mut out = format!("Transaction {} on {}\n", tx.hash, chain.name);
    match tx.block_number {
        Some(number) => {
            let _ = writeln!(out, "Status: included in block {}", number);
        }
        None => {
            let _ = writeln!(out, "Status: pending");
        }
    }
    let _ = writeln!(out, "From: {}", tx.from);
    match &tx.to {
        Some(to) => {
            let _ = writeln!(out, "To: {}", to);
        }
        None => {
            let _ = writeln!(out, "To: (contract creation)");
        }
    }
    let _ = writeln!(
        out,
        "Value: {} {}",
        format_units(tx.value, chain.decimals),
        chain.symbol
    );
    let _ = writeln!(out, "Gas limit: {}", tx.gas);
    if let Some(price) = tx.gas_price {
        let _ = writeln!(out, "Gas price: {} gwei", format_gwei(price));
    }
    let _ = writeln!(out, "Nonce: {}", tx.nonce);
    let _ = writeln!(out, "Input: {} bytes", tx.input_len);
    let _ = write!(out, "Explorer: {}", chain.tx_url(&tx.hash));
    out
}

use crate::{
    blockchain::{
        models::{BlockQuery, BlockSummary, ChainInfo},
        ChainReader,
    },
    mcp::{
        protocol::ContentBlock,
        registry::{ToolDefinition, ToolResult},
        schema::{ParamKind, ParamSpec, ParameterSchema, ValidatedArgs},
    },
    utils::format_gwei,
};
use anyhow::{anyhow, Result};
use std::fmt::Write;
use std::sync::Arc;

pub const NAME: &str = "get-block-info";

pub fn tool(reader: Arc<dyn ChainReader>, chain: Arc<ChainInfo>) -> ToolDefinition {
    let schema = ParameterSchema::new().field(
        "blockNumber",
        ParamSpec::optional(ParamKind::Integer)
            .describe("Block number to fetch. Omit for the latest block."),
    );
    let description = format!("Get information about a block on {}", chain.name);

    ToolDefinition::new(NAME, description, schema, "retrieve block info", move |args| {
        let reader = reader.clone();
        let chain = chain.clone();
        async move { get_block_info(reader.as_ref(), &chain, args).await }
    })
}

async fn get_block_info(
    reader: &dyn ChainReader,
    chain: &ChainInfo,
    args: ValidatedArgs,
) -> ToolResult {
    let query = block_query(&args)?;
    let block = reader
        .block(query)
        .await?
        .ok_or_else(|| anyhow!("block {} not found", query))?;
    Ok(vec![ContentBlock::text(render(&block, chain))])
}

fn block_query(args: &ValidatedArgs) -> Result<BlockQuery> {
    let value = match args.get("blockNumber") {
        Some(value) => value,
        None => return Ok(BlockQuery::Latest),
    };
    value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f < u64::MAX as f64)
                .map(|f| f as u64)
        })
        .map(BlockQuery::Number)
        .ok_or_else(|| anyhow!("block number must be a non-negative integer, got {}", value))
}

fn render(block: &BlockSummary, chain: &ChainInfo) -> String {
    let mut out = format!("Block {} on {}\n", block.number, chain.name);
    let _ = writeln!(out, "Hash: {}", block.hash);
    let _ = writeln!(out, "Parent hash: {}", block.parent_hash);
    match block.time() {
        Some(time) => {
            let _ = writeln!(out, "Timestamp: {} (unix {})", time.to_rfc3339(), block.timestamp);
        }
        None => {
            let _ = writeln!(out, "Timestamp: unix {}", block.timestamp);
        }
    }
    let _ = writeln!(out, "Transactions: {}", block.transaction_count);
    let _ = writeln!(out, "Gas used: {} / {}", block.gas_used, block.gas_limit);
    if let Some(base_fee) = block.base_fee_per_gas {
        let _ = writeln!(out, "Base fee: {} gwei", format_gwei(base_fee));
    }
    if let Some(miner) = &block.miner {
        let _ = writeln!(out, "Miner: {}", miner);
    }
    out.trim_end().to_string()
}

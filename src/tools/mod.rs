//! # Chain Tools
//!
//! The read-only tools this server exposes. Each one is a thin handler over
//! a [`ChainReader`] that renders its result as text.
//!
//! - `get-balance` - native balance of an address
//! - `get-block-info` - a block by number, or the latest one
//! - `get-transaction` - a transaction by hash
//! - `get-gas-price` - the current gas price

pub mod balance;
pub mod block;
pub mod gas;
pub mod transaction;

use crate::{
    blockchain::{models::ChainInfo, ChainReader},
    mcp::{
        registry::{RegistryError, ToolRegistry},
        schema::ValidatedArgs,
    },
};
use anyhow::{anyhow, Result};
use std::sync::Arc;

/// Registers every chain tool, in catalog order.
pub fn register_chain_tools(
    registry: &mut ToolRegistry,
    reader: Arc<dyn ChainReader>,
    chain: ChainInfo,
) -> Result<(), RegistryError> {
    let chain = Arc::new(chain);
    registry.register(balance::tool(reader.clone(), chain.clone()))?;
    registry.register(block::tool(reader.clone(), chain.clone()))?;
    registry.register(transaction::tool(reader.clone(), chain.clone()))?;
    registry.register(gas::tool(reader, chain))?;
    Ok(())
}

fn required_str(args: &ValidatedArgs, name: &str) -> Result<String> {
    args.str(name)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("missing required argument '{}'", name))
}

//! Read-only access to chain data.
//!
//! Tools depend on [`ChainReader`] rather than a concrete client so the
//! dispatch path can be exercised against in-memory stubs.

use anyhow::Result;
use async_trait::async_trait;
use ethers::types::U256;

use crate::blockchain::models::{BlockQuery, BlockSummary, TransactionSummary};

pub use super::evm_client::EvmClient;

#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Native balance of `address`, in the smallest unit (wei).
    async fn balance(&self, address: &str) -> Result<U256>;

    /// `Ok(None)` when the node has no such block.
    async fn block(&self, query: BlockQuery) -> Result<Option<BlockSummary>>;

    /// `Ok(None)` when the node does not know the hash.
    async fn transaction(&self, hash: &str) -> Result<Option<TransactionSummary>>;

    /// Current gas price in wei.
    async fn gas_price(&self) -> Result<U256>;
}

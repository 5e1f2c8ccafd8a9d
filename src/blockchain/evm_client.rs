// src/blockchain/evm_client.rs

use crate::blockchain::{
    client::ChainReader,
    models::{BlockQuery, BlockSummary, ChainInfo, TransactionSummary},
};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use ethers::{
    providers::{Http, Middleware, Provider},
    types::{Address, BlockId, BlockNumber, H256, U256},
    utils::to_checksum,
};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// JSON-RPC client for a single EVM-compatible chain.
#[derive(Clone, Debug)]
pub struct EvmClient {
    provider: Arc<Provider<Http>>,
    chain: ChainInfo,
}

impl EvmClient {
    /// Create a client for the chain's RPC URL. No request is made yet.
    pub fn new(chain: ChainInfo) -> Result<Self> {
        let provider = Provider::<Http>::try_from(chain.rpc_url.as_str())
            .map_err(|e| anyhow!("Failed to create provider for {}: {}", chain.rpc_url, e))?;
        Ok(Self {
            provider: Arc::new(provider),
            chain,
        })
    }

    /// Create a client and, when `verify` is set, confirm the node serves the configured chain.
    pub async fn connect(chain: ChainInfo, verify: bool) -> Result<Self> {
        let client = Self::new(chain)?;
        if verify {
            client.verify_chain_id().await?;
        }
        Ok(client)
    }

    pub fn chain(&self) -> &ChainInfo {
        &self.chain
    }

    pub async fn verify_chain_id(&self) -> Result<()> {
        let reported = self
            .provider
            .get_chainid()
            .await
            .with_context(|| format!("Failed to reach RPC endpoint {}", self.chain.rpc_url))?;
        if reported != U256::from(self.chain.id) {
            bail!(
                "RPC endpoint {} serves chain {}, expected {} ({})",
                self.chain.rpc_url,
                reported,
                self.chain.id,
                self.chain.name
            );
        }
        info!("Connected to {} (chain id {})", self.chain.name, self.chain.id);
        Ok(())
    }
}

fn parse_address(address: &str) -> Result<Address> {
    Address::from_str(address.trim()).map_err(|e| anyhow!("Invalid address '{}': {}", address, e))
}

fn parse_hash(hash: &str) -> Result<H256> {
    H256::from_str(hash.trim()).map_err(|e| anyhow!("Invalid transaction hash '{}': {}", hash, e))
}

#[async_trait]
impl ChainReader for EvmClient {
    async fn balance(&self, address: &str) -> Result<U256> {
        let address = parse_address(address)?;
        debug!("eth_getBalance {:?}", address);
        self.provider
            .get_balance(address, None)
            .await
            .context("eth_getBalance request failed")
    }

    async fn block(&self, query: BlockQuery) -> Result<Option<BlockSummary>> {
        let id: BlockId = match query {
            BlockQuery::Latest => BlockNumber::Latest.into(),
            BlockQuery::Number(n) => BlockNumber::Number(n.into()).into(),
        };
        debug!("eth_getBlockByNumber {}", query);

        let block = match self
            .provider
            .get_block(id)
            .await
            .context("eth_getBlockByNumber request failed")?
        {
            Some(block) => block,
            None => return Ok(None),
        };

        let number = block
            .number
            .ok_or_else(|| anyhow!("node returned a block without a number"))?
            .as_u64();

        Ok(Some(BlockSummary {
            number,
            hash: block
                .hash
                .map(|h| format!("{:?}", h))
                .unwrap_or_else(|| "pending".to_string()),
            parent_hash: format!("{:?}", block.parent_hash),
            timestamp: block.timestamp.low_u64(),
            transaction_count: block.transactions.len(),
            gas_used: block.gas_used,
            gas_limit: block.gas_limit,
            base_fee_per_gas: block.base_fee_per_gas,
            miner: block.author.map(|a| to_checksum(&a, None)),
        }))
    }

    async fn transaction(&self, hash: &str) -> Result<Option<TransactionSummary>> {
        let hash = parse_hash(hash)?;
        debug!("eth_getTransactionByHash {:?}", hash);

        let tx = match self
            .provider
            .get_transaction(hash)
            .await
            .context("eth_getTransactionByHash request failed")?
        {
            Some(tx) => tx,
            None => return Ok(None),
        };

        Ok(Some(TransactionSummary {
            hash: format!("{:?}", tx.hash),
            from: to_checksum(&tx.from, None),
            to: tx.to.map(|a| to_checksum(&a, None)),
            value: tx.value,
            gas: tx.gas,
            gas_price: tx.gas_price,
            nonce: tx.nonce,
            block_number: tx.block_number.map(|n| n.as_u64()),
            input_len: tx.input.len(),
        }))
    }

    async fn gas_price(&self) -> Result<U256> {
        debug!("eth_gasPrice");
        self.provider
            .get_gas_price()
            .await
            .context("eth_gasPrice request failed")
    }
}

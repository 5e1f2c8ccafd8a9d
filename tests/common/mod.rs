//! In-memory chain stub shared by the integration tests

#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use monad_mcp_server::{
    blockchain::{
        models::{BlockQuery, BlockSummary, TransactionSummary},
        ChainReader, U256,
    },
    build_server,
    config::Config,
    mcp::handler::McpServer,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const TX_HASH: &str = "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b";

#[derive(Default)]
pub struct StubChain {
    pub balance: U256,
    pub gas_price: U256,
    pub fail_blocks: bool,
    pub hang_gas_price: bool,
    pub calls: AtomicUsize,
}

impl StubChain {
    pub fn with_balance(balance: U256) -> Self {
        Self {
            balance,
            gas_price: U256::from(52_000_000_000u64),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainReader for StubChain {
    async fn balance(&self, _address: &str) -> Result<U256> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.balance)
    }

    async fn block(&self, query: BlockQuery) -> Result<Option<BlockSummary>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_blocks {
            bail!("upstream node rejected block {}", query);
        }
        let number = match query {
            BlockQuery::Latest => 1_000,
            BlockQuery::Number(n) if n > 1_000 => return Ok(None),
            BlockQuery::Number(n) => n,
        };
        Ok(Some(BlockSummary {
            number,
            hash: format!("0x{:064x}", number),
            parent_hash: format!("0x{:064x}", number.saturating_sub(1)),
            timestamp: 1_700_000_000,
            transaction_count: 2,
            gas_used: U256::from(42_000u64),
            gas_limit: U256::from(30_000_000u64),
            base_fee_per_gas: Some(U256::from(50_000_000_000u64)),
            miner: Some("0x0000000000000000000000000000000000000001".to_string()),
        }))
    }

    async fn transaction(&self, hash: &str) -> Result<Option<TransactionSummary>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if hash != TX_HASH {
            return Ok(None);
        }
        Ok(Some(TransactionSummary {
            hash: hash.to_string(),
            from: "0x00000000000000000000000000000000000000aA".to_string(),
            to: Some("0x00000000000000000000000000000000000000bB".to_string()),
            value: U256::exp10(18) * 3,
            gas: U256::from(21_000u64),
            gas_price: Some(U256::from(60_000_000_000u64)),
            nonce: U256::from(9u64),
            block_number: Some(999),
            input_len: 0,
        }))
    }

    async fn gas_price(&self) -> Result<U256> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_gas_price {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        Ok(self.gas_price)
    }
}

pub fn server_with(stub: Arc<StubChain>) -> McpServer {
    server_with_config(&Config::default(), stub)
}

pub fn server_with_config(config: &Config, stub: Arc<StubChain>) -> McpServer {
    build_server(config, stub).expect("chain tools register cleanly")
}

// src/blockchain/models.rs
use chrono::{DateTime, Utc};
use ethers::types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Static parameters of the network the server reads from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
    pub id: u64,
    pub name: String,
    /// Ticker of the native currency, e.g. "MON".
    pub symbol: String,
    pub decimals: u32,
    pub rpc_url: String,
    pub explorer_url: String,
}

impl ChainInfo {
    pub fn monad_testnet() -> Self {
        Self {
            id: 10_143,
            name: "Monad Testnet".to_string(),
            symbol: "MON".to_string(),
            decimals: 18,
            rpc_url: "https://testnet-rpc.monad.xyz".to_string(),
            explorer_url: "https://testnet.monadexplorer.com".to_string(),
        }
    }

    pub fn tx_url(&self, hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), hash)
    }
}

impl Default for ChainInfo {
    fn default() -> Self {
        Self::monad_testnet()
    }
}

/// Which block to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockQuery {
    Latest,
    Number(u64),
}

impl fmt::Display for BlockQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockQuery::Latest => f.write_str("latest"),
            BlockQuery::Number(n) => write!(f, "{}", n),
        }
    }
}

/// The fields of a block the tools report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSummary {
    pub number: u64,
    pub hash: String,
    pub parent_hash: String,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    pub transaction_count: usize,
    pub gas_used: U256,
    pub gas_limit: U256,
    pub base_fee_per_gas: Option<U256>,
    pub miner: Option<String>,
}

impl BlockSummary {
    pub fn time(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.timestamp)
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
    }
}

/// The fields of a transaction the tools report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSummary {
    pub hash: String,
    pub from: String,
    /// `None` for contract creation.
    pub to: Option<String>,
    pub value: U256,
    pub gas: U256,
    pub gas_price: Option<U256>,
    pub nonce: U256,
    /// `None` while the transaction is pending.
    pub block_number: Option<u64>,
    pub input_len: usize,
}

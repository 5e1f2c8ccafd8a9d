// src/blockchain/mod.rs

pub mod client;
pub mod evm_client;
pub mod models;

pub use client::{ChainReader, EvmClient};

// Re-export commonly used types
pub use ethers::types::{Address, H256, U256};

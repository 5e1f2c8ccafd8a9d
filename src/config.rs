// src/config.rs

use crate::blockchain::models::ChainInfo;
use anyhow::{bail, Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

// A struct to hold all configuration, loaded once at startup from the environment / .env file.
#[derive(Clone, Debug)]
pub struct Config {
    /// Network the tools read from
    pub chain: ChainInfo,
    /// Check the node's chain id before serving
    pub verify_chain_id: bool,

    // Server settings
    pub server_name: String,
    pub handler_timeout: Duration,
    pub write_retry_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chain: ChainInfo::monad_testnet(),
            verify_chain_id: true,
            server_name: "monad-testnet".to_string(),
            handler_timeout: Duration::from_secs(30),
            write_retry_limit: 3,
        }
    }
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("{} must be a valid {}", name, std::any::type_name::<T>())),
        Err(_) => Ok(None),
    }
}

fn parse_flag(name: &str) -> Result<Option<bool>> {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            other => bail!("{} must be true or false, got '{}'", name, other),
        },
        Err(_) => Ok(None),
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();

        let mut config = Config::default();
        let chain = &mut config.chain;

        if let Ok(rpc_url) = env::var("RPC_URL") {
            chain.rpc_url = rpc_url.trim().to_string();
        }
        Url::parse(&chain.rpc_url)
            .with_context(|| format!("RPC_URL is not a valid URL: {}", chain.rpc_url))?;

        if let Some(id) = parse_var::<u64>("CHAIN_ID")? {
            chain.id = id;
        }
        if let Ok(name) = env::var("CHAIN_NAME") {
            chain.name = name;
        }
        if let Ok(symbol) = env::var("NATIVE_SYMBOL") {
            chain.symbol = symbol;
        }
        if let Some(decimals) = parse_var::<u32>("NATIVE_DECIMALS")? {
            if decimals > 77 {
                bail!("NATIVE_DECIMALS must be at most 77, got {}", decimals);
            }
            chain.decimals = decimals;
        }
        if let Ok(explorer_url) = env::var("EXPLORER_URL") {
            chain.explorer_url = explorer_url.trim().to_string();
        }

        if let Some(verify) = parse_flag("VERIFY_CHAIN_ID")? {
            config.verify_chain_id = verify;
        }
        if let Ok(name) = env::var("SERVER_NAME") {
            config.server_name = name;
        }
        if let Some(secs) = parse_var::<u64>("HANDLER_TIMEOUT_SECS")? {
            if secs == 0 {
                bail!("HANDLER_TIMEOUT_SECS must be greater than zero");
            }
            config.handler_timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = parse_var::<u32>("WRITE_RETRY_LIMIT")? {
            config.write_retry_limit = retries;
        }

        Ok(config)
    }
}

//! Formatting helpers shared by the chain tools

use ethers::types::U256;

pub const GWEI_DECIMALS: u32 = 9;

/// Render an integer amount of base units as a decimal with `decimals`
/// fractional digits, dropping trailing zeros (10^18 with 18 decimals is "1").
pub fn format_units(amount: U256, decimals: u32) -> String {
    match ethers::utils::format_units(amount, decimals) {
        Ok(formatted) => trim_fraction(&formatted).to_string(),
        // only reachable above 77 decimals, which config rejects
        Err(_) => amount.to_string(),
    }
}

fn trim_fraction(formatted: &str) -> &str {
    if !formatted.contains('.') {
        return formatted;
    }
    formatted.trim_end_matches('0').trim_end_matches('.')
}

pub fn format_gwei(wei: U256) -> String {
    format_units(wei, GWEI_DECIMALS)
}

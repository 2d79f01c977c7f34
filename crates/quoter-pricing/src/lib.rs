//! USD price oracle for the compact quoter.
//!
//! This crate provides the oracle interface the quote pipeline uses to
//! resolve token metadata and wei-scaled USD prices, together with the
//! CoinGecko-backed production implementation.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use quoter_types::{OracleError, TokenInfo};

/// Chains with a known oracle platform, paired with the platform id the
/// price API uses for them.
pub const CHAIN_PLATFORMS: &[(u64, &str)] = &[
	(1, "ethereum"),
	(10, "optimistic-ethereum"),
	(8453, "base"),
	(130, "unichain"),
];

/// Resolve a chain id to its oracle platform id.
pub fn chain_to_platform(chain_id: u64) -> Result<&'static str, OracleError> {
	CHAIN_PLATFORMS
		.iter()
		.find(|(id, _)| *id == chain_id)
		.map(|(_, platform)| *platform)
		.ok_or(OracleError::UnsupportedChain(chain_id))
}

/// Interface the pipeline uses to price tokens in USD.
///
/// Prices are 18-decimal fixed point (`floor(usd * 10^18)`) so that oracle
/// and router outputs compose without unit juggling.
#[async_trait]
pub trait UsdOracle: Send + Sync {
	/// Decimals and symbol for a token. The zero address resolves to the
	/// chain's native token without a network round trip.
	async fn token_info(&self, chain_id: u64, token: Address) -> Result<TokenInfo, OracleError>;

	/// USD price of one whole token, wei-scaled.
	async fn usd_price_wei(&self, chain_id: u64, token: Address) -> Result<U256, OracleError>;
}

/// Re-export implementations
pub mod implementations {
	pub mod coingecko;
}

pub use implementations::coingecko::CoinGeckoOracle;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_chain_to_platform_known_chains() {
		assert_eq!(chain_to_platform(1).unwrap(), "ethereum");
		assert_eq!(chain_to_platform(10).unwrap(), "optimistic-ethereum");
		assert_eq!(chain_to_platform(8453).unwrap(), "base");
		assert_eq!(chain_to_platform(130).unwrap(), "unichain");
	}

	#[test]
	fn test_chain_to_platform_unknown_chain() {
		let err = chain_to_platform(42161).unwrap_err();
		assert!(matches!(err, OracleError::UnsupportedChain(42161)));
	}
}

//! Service configuration from environment variables.
//!
//! RPC endpoints for the four supported chains are required; API keys and
//! the bind address are optional. Configuration is loaded once at startup
//! and immutable afterwards.

use std::collections::HashMap;
use thiserror::Error;

/// RPC URL environment variable per supported chain.
const RPC_ENV_VARS: &[(u64, &str)] = &[
	(1, "ETHEREUM_RPC_URL"),
	(10, "OPTIMISM_RPC_URL"),
	(8453, "BASE_RPC_URL"),
	(130, "UNICHAIN_RPC_URL"),
];

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_PRICE_CACHE_SECONDS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("Missing required environment variable: {0}")]
	MissingVar(&'static str),
	#[error("Invalid value for {0}: {1}")]
	InvalidVar(&'static str, String),
}

/// Resolved service configuration.
#[derive(Debug, Clone)]
pub struct Config {
	pub host: String,
	pub port: u16,
	/// RPC endpoint per supported chain id.
	pub rpc_urls: HashMap<u64, String>,
	pub coingecko_api_key: Option<String>,
	pub uniswap_api_key: Option<String>,
	/// USD price cache TTL in seconds.
	pub price_cache_seconds: u64,
}

impl Config {
	/// Load configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Load configuration through an arbitrary variable lookup.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		let mut rpc_urls = HashMap::new();
		for (chain_id, var) in RPC_ENV_VARS {
			let url = lookup(var).ok_or(ConfigError::MissingVar(var))?;
			rpc_urls.insert(*chain_id, url);
		}

		let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
		let port = match lookup("PORT") {
			Some(raw) => raw
				.parse::<u16>()
				.map_err(|e| ConfigError::InvalidVar("PORT", e.to_string()))?,
			None => DEFAULT_PORT,
		};
		let price_cache_seconds = match lookup("PRICE_CACHE_SECONDS") {
			Some(raw) => raw
				.parse::<u64>()
				.map_err(|e| ConfigError::InvalidVar("PRICE_CACHE_SECONDS", e.to_string()))?,
			None => DEFAULT_PRICE_CACHE_SECONDS,
		};

		Ok(Self {
			host,
			port,
			rpc_urls,
			coingecko_api_key: lookup("COINGECKO_API_KEY"),
			uniswap_api_key: lookup("UNISWAP_API_KEY"),
			price_cache_seconds,
		})
	}
}

//! CoinGecko oracle implementation for production use.
//!
//! Fetches token metadata and USD prices from the CoinGecko API with
//! per-key TTL caches and client-side rate limiting. Prices arrive as
//! floats with 4-8 significant digits and are floored into 18-decimal
//! fixed point before anything downstream sees them.

use crate::{chain_to_platform, UsdOracle};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use quoter_types::{OracleError, TokenInfo};
use reqwest::{
	header::{HeaderMap, HeaderValue, ACCEPT},
	Client,
};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use tracing::debug;

/// Token metadata cache TTL.
const TOKEN_INFO_TTL_SECS: u64 = 24 * 60 * 60;

/// Cache entry with its fetch time.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
	value: T,
	fetched_at: u64,
}

/// CoinGecko-backed USD oracle with caching and rate limiting.
pub struct CoinGeckoOracle {
	/// HTTP client for API requests
	client: Client,
	/// Base URL for the API
	base_url: String,
	/// USD price cache, wei-scaled values
	price_cache: RwLock<HashMap<(u64, Address), CacheEntry<U256>>>,
	/// Token metadata cache
	token_cache: RwLock<HashMap<(u64, Address), CacheEntry<TokenInfo>>>,
	/// Supported platform ids, fetched once per process
	platforms: RwLock<Option<HashSet<String>>>,
	/// Price cache duration in seconds
	price_ttl: u64,
	/// Rate limit delay in milliseconds
	rate_limit_delay_ms: u64,
	/// Last API call timestamp
	last_api_call: RwLock<Option<u64>>,
}

/// `GET /asset_platforms` entry.
#[derive(Debug, Deserialize)]
struct AssetPlatform {
	id: String,
}

/// `GET /coins/{platform}/contract/{address}` response, reduced to the
/// fields we read.
#[derive(Debug, Deserialize)]
struct ContractInfoResponse {
	symbol: String,
	detail_platforms: HashMap<String, DetailPlatform>,
}

#[derive(Debug, Deserialize)]
struct DetailPlatform {
	decimal_place: Option<u8>,
}

impl CoinGeckoOracle {
	/// Creates a new oracle. An API key switches to the pro host and
	/// tightens the client-side rate limit the same way the upstream API
	/// tiers do.
	pub fn new(api_key: Option<String>, price_ttl_seconds: u64) -> Result<Self, OracleError> {
		let base_url = if api_key.is_some() {
			"https://pro-api.coingecko.com/api/v3"
		} else {
			"https://api.coingecko.com/api/v3"
		}
		.to_string();

		let rate_limit_delay_ms = if api_key.is_some() { 100 } else { 1200 };

		let mut headers = HeaderMap::new();
		if let Some(ref key) = api_key {
			headers.insert(
				"x-cg-pro-api-key",
				HeaderValue::from_str(key)
					.map_err(|e| OracleError::InvalidData(format!("Invalid API key format: {}", e)))?,
			);
		}
		headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

		let client = Client::builder()
			.default_headers(headers)
			.user_agent("compact-quoter/0.1.0")
			.timeout(Duration::from_secs(30))
			.build()
			.map_err(|e| OracleError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

		debug!(
			"CoinGecko oracle initialized - Base URL: {}, Price TTL: {}s, Rate limit: {}ms",
			base_url, price_ttl_seconds, rate_limit_delay_ms
		);

		Ok(Self {
			client,
			base_url,
			price_cache: RwLock::new(HashMap::new()),
			token_cache: RwLock::new(HashMap::new()),
			platforms: RwLock::new(None),
			price_ttl: price_ttl_seconds,
			rate_limit_delay_ms,
			last_api_call: RwLock::new(None),
		})
	}

	/// Supported platform ids, fetched once per process and cached for its
	/// lifetime.
	pub async fn platforms(&self) -> Result<HashSet<String>, OracleError> {
		{
			let cached = self.platforms.read().await;
			if let Some(platforms) = cached.as_ref() {
				return Ok(platforms.clone());
			}
		}

		let url = format!("{}/asset_platforms", self.base_url);
		let entries: Vec<AssetPlatform> = self.get_json(&url).await?;
		let ids: HashSet<String> = entries.into_iter().map(|p| p.id).collect();

		let mut cached = self.platforms.write().await;
		// First writer wins; a concurrent fetch produced the same set.
		if cached.is_none() {
			*cached = Some(ids.clone());
		}
		Ok(ids)
	}

	/// Apply rate limiting
	async fn apply_rate_limit(&self) {
		let mut last_call = self.last_api_call.write().await;

		if let Some(last_timestamp) = *last_call {
			let now = now_millis();
			let elapsed = now.saturating_sub(last_timestamp);
			if elapsed < self.rate_limit_delay_ms {
				let delay = self.rate_limit_delay_ms - elapsed;
				tokio::time::sleep(Duration::from_millis(delay)).await;
			}
		}

		*last_call = Some(now_millis());
	}

	async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, OracleError> {
		self.apply_rate_limit().await;

		debug!("Fetching from CoinGecko API: {}", url);

		let response = self
			.client
			.get(url)
			.send()
			.await
			.map_err(|e| OracleError::Unavailable(format!("API request failed: {}", e)))?;

		if !response.status().is_success() {
			let status = response.status();
			let body = response.text().await.unwrap_or_default();
			return Err(OracleError::Unavailable(format!(
				"API returned error status {}: {}",
				status, body
			)));
		}

		response
			.json::<T>()
			.await
			.map_err(|e| OracleError::InvalidData(format!("Failed to parse response: {}", e)))
	}

	async fn fetch_token_info(
		&self,
		chain_id: u64,
		token: Address,
	) -> Result<TokenInfo, OracleError> {
		let platform = chain_to_platform(chain_id)?;
		let url = format!(
			"{}/coins/{}/contract/{:#x}",
			self.base_url, platform, token
		);

		let info: ContractInfoResponse = self.get_json(&url).await?;
		let decimals = info
			.detail_platforms
			.get(platform)
			.and_then(|p| p.decimal_place)
			.ok_or_else(|| {
				OracleError::InvalidData(format!("No decimals for token {:#x} on {}", token, platform))
			})?;

		Ok(TokenInfo {
			decimals,
			symbol: info.symbol.to_uppercase(),
		})
	}

	async fn fetch_usd_price(&self, chain_id: u64, token: Address) -> Result<U256, OracleError> {
		let prices: HashMap<String, HashMap<String, Decimal>> = if token == Address::ZERO {
			// Native tokens price as mainnet ETH regardless of chain.
			let url = format!(
				"{}/simple/price?ids=ethereum&vs_currencies=usd",
				self.base_url
			);
			self.get_json(&url).await?
		} else {
			let platform = chain_to_platform(chain_id)?;
			let url = format!(
				"{}/simple/token_price/{}?contract_addresses={:#x}&vs_currencies=usd",
				self.base_url, platform, token
			);
			self.get_json(&url).await?
		};

		let key = if token == Address::ZERO {
			"ethereum".to_string()
		} else {
			format!("{:#x}", token)
		};

		let usd = prices
			.get(&key)
			.and_then(|entry| entry.get("usd"))
			.copied()
			.ok_or_else(|| {
				OracleError::Unavailable(format!("No USD price for {} on chain {}", key, chain_id))
			})?;

		usd_to_wei(usd)
	}
}

#[async_trait]
impl UsdOracle for CoinGeckoOracle {
	async fn token_info(&self, chain_id: u64, token: Address) -> Result<TokenInfo, OracleError> {
		if token == Address::ZERO {
			return Ok(TokenInfo::native());
		}
		// Validate the chain before consulting the cache so unsupported
		// chains fail the same way on every request.
		chain_to_platform(chain_id)?;

		{
			let cache = self.token_cache.read().await;
			if let Some(entry) = cache.get(&(chain_id, token)) {
				if now_secs() - entry.fetched_at < TOKEN_INFO_TTL_SECS {
					return Ok(entry.value.clone());
				}
			}
		}

		let info = self.fetch_token_info(chain_id, token).await?;

		let mut cache = self.token_cache.write().await;
		cache.insert(
			(chain_id, token),
			CacheEntry {
				value: info.clone(),
				fetched_at: now_secs(),
			},
		);

		debug!(
			"Fetched and cached token info for {:#x} on chain {}: {} ({} decimals)",
			token, chain_id, info.symbol, info.decimals
		);
		Ok(info)
	}

	async fn usd_price_wei(&self, chain_id: u64, token: Address) -> Result<U256, OracleError> {
		{
			let cache = self.price_cache.read().await;
			if let Some(entry) = cache.get(&(chain_id, token)) {
				if now_secs() - entry.fetched_at < self.price_ttl {
					debug!(
						"Using cached price for {:#x} on chain {}: {}",
						token, chain_id, entry.value
					);
					return Ok(entry.value);
				}
			}
		}

		let price = self.fetch_usd_price(chain_id, token).await?;

		let mut cache = self.price_cache.write().await;
		cache.insert(
			(chain_id, token),
			CacheEntry {
				value: price,
				fetched_at: now_secs(),
			},
		);

		debug!(
			"Fetched and cached price for {:#x} on chain {}: {}",
			token, chain_id, price
		);
		Ok(price)
	}
}

/// Floor a decimal USD price into 18-decimal fixed point.
fn usd_to_wei(usd: Decimal) -> Result<U256, OracleError> {
	if usd.is_sign_negative() {
		return Err(OracleError::InvalidData(format!("Negative price: {}", usd)));
	}

	let scale = Decimal::from(1_000_000_000_000_000_000u64);
	let scaled = usd.checked_mul(scale).ok_or_else(|| {
		OracleError::InvalidData(format!("Price out of range: {}", usd))
	})?;

	let floored = scaled.trunc().to_u128().ok_or_else(|| {
		OracleError::InvalidData(format!("Price out of range: {}", usd))
	})?;

	Ok(U256::from(floored))
}

fn now_secs() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.unwrap()
		.as_secs()
}

fn now_millis() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.unwrap()
		.as_millis() as u64
}

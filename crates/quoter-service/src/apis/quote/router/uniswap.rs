//! Uniswap Trading API integration.
//!
//! Implements the single-leg router primitive against Uniswap's quote
//! endpoint. Each leg is one POST returning an indicative exact-input
//! output amount; the zero address stands for the chain's native token on
//! both sides of the request.

use super::RouterApi;
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use quoter_types::RouterError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.uniswap.org/v2/quote";

/// Uniswap quote API client.
#[derive(Clone, Debug)]
pub struct UniswapRouterApi {
	/// HTTP client for API requests
	client: Client,
	/// Optional API key for authenticated requests
	api_key: Option<String>,
	/// Base URL for the quote endpoint
	base_url: String,
}

/// Quote request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteRequestBody {
	token_in_chain_id: u64,
	token_in_address: String,
	token_out_chain_id: u64,
	token_out_address: String,
	amount: String,
	#[serde(rename = "type")]
	trade_type: &'static str,
}

/// Quote response, reduced to the fields we read.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResponseBody {
	/// Output amount in the token's smallest unit
	quote: String,
	/// Output amount adjusted for execution gas, when the API provides it
	quote_gas_adjusted: Option<String>,
}

impl UniswapRouterApi {
	pub fn new(api_key: Option<String>) -> Result<Self, RouterError> {
		let client = Client::builder()
			.pool_max_idle_per_host(10)
			.timeout(Duration::from_secs(30))
			.build()
			.map_err(|e| RouterError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self {
			client,
			api_key,
			base_url: DEFAULT_BASE_URL.to_string(),
		})
	}

	fn request_body(
		chain_id: u64,
		token_in: Address,
		token_out: Address,
		amount_in: U256,
	) -> QuoteRequestBody {
		QuoteRequestBody {
			token_in_chain_id: chain_id,
			token_in_address: format!("{:#x}", token_in),
			token_out_chain_id: chain_id,
			token_out_address: format!("{:#x}", token_out),
			amount: amount_in.to_string(),
			trade_type: "EXACT_INPUT",
		}
	}
}

#[async_trait]
impl RouterApi for UniswapRouterApi {
	async fn leg(
		&self,
		chain_id: u64,
		token_in: Address,
		token_out: Address,
		amount_in: U256,
	) -> Result<U256, RouterError> {
		let body = Self::request_body(chain_id, token_in, token_out, amount_in);

		tracing::debug!(
			"Fetching router leg: chain={}, token_in={:#x}, token_out={:#x}, amount={}",
			chain_id,
			token_in,
			token_out,
			amount_in
		);

		let mut request = self.client.post(&self.base_url).json(&body);
		if let Some(ref key) = self.api_key {
			request = request.header("x-api-key", key);
		}

		let response = request
			.send()
			.await
			.map_err(|e| RouterError::Unavailable(format!("Router request failed: {}", e)))?;

		if !response.status().is_success() {
			let status = response.status();
			let text = response.text().await.unwrap_or_default();
			return Err(RouterError::Unavailable(format!(
				"Router returned status {}: {}",
				status, text
			)));
		}

		let quote: QuoteResponseBody = response.json().await.map_err(|e| {
			RouterError::InvalidResponse(format!("Failed to parse router response: {}", e))
		})?;

		let amount = quote.quote_gas_adjusted.unwrap_or(quote.quote);
		amount.parse::<U256>().map_err(|e| {
			RouterError::InvalidResponse(format!("Invalid output amount '{}': {}", amount, e))
		})
	}
}

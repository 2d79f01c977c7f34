//! Tribunal view-call client.
//!
//! Simulates `quote` on the destination-chain tribunal to discover the
//! dispensation a filler will be charged, and `deriveMandateHash` for
//! cross-checking locally computed witness hashes. Calls are plain JSON-RPC
//! `eth_call` requests against per-chain endpoints.

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use quoter_types::{Mandate, TribunalError};
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

/// Base needs an explicit gas budget and price on view calls; its fee-data
/// endpoints otherwise make large simulations revert.
const BASE_CHAIN_ID: u64 = 8453;
const BASE_CALL_GAS: u64 = 10_000_000;

// Tribunal view interface
sol! {
	interface ITribunal {
		struct Claim {
			uint256 chainId;
			address arbiter;
			address sponsor;
			uint256 nonce;
			uint256 expires;
			uint256 id;
			uint256 amount;
		}

		struct Mandate {
			uint256 chainId;
			address tribunal;
			address recipient;
			uint256 expires;
			address token;
			uint256 minimumAmount;
			uint256 baselinePriorityFee;
			uint256 scalingFactor;
			bytes32 salt;
		}

		function quote(
			Claim calldata claim,
			Mandate calldata mandate,
			address claimant
		) external view returns (uint256 dispensation);

		function deriveMandateHash(
			Mandate calldata mandate
		) external view returns (bytes32);
	}
}

/// Source-side claim fields the tribunal prices against. The nonce is
/// always zero at quote time; allocators assign it at signing.
#[derive(Debug, Clone, Copy)]
pub struct TribunalClaim {
	pub chain_id: u64,
	pub arbiter: Address,
	pub sponsor: Address,
	/// Claim deadline, unix seconds.
	pub expires: U256,
	pub id: U256,
	pub amount: U256,
}

/// Interface the pipeline uses to consult tribunals.
#[async_trait]
pub trait TribunalApi: Send + Sync {
	/// Simulate the dispensation (wei) for settling this claim.
	async fn simulate_dispensation(
		&self,
		destination_chain_id: u64,
		claim: &TribunalClaim,
		mandate: &Mandate,
		claimant: Address,
	) -> Result<U256, TribunalError>;

	/// On-chain mandate hash, used to cross-check the local witness hash.
	async fn derive_mandate_hash(
		&self,
		destination_chain_id: u64,
		mandate: &Mandate,
	) -> Result<B256, TribunalError>;
}

/// Per-chain tribunal endpoint.
#[derive(Debug, Clone)]
pub struct TribunalEndpoint {
	pub rpc_url: String,
	pub tribunal: Address,
}

/// JSON-RPC backed tribunal client, one endpoint per chain, sharing a
/// pooled HTTP client across requests.
pub struct RpcTribunalClient {
	client: Client,
	endpoints: HashMap<u64, TribunalEndpoint>,
}

impl RpcTribunalClient {
	pub fn new(endpoints: HashMap<u64, TribunalEndpoint>) -> Result<Self, TribunalError> {
		let client = Client::builder()
			.pool_max_idle_per_host(10)
			.timeout(Duration::from_secs(30))
			.build()
			.map_err(|e| TribunalError::Rpc(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self { client, endpoints })
	}

	fn endpoint(&self, chain_id: u64) -> Result<&TribunalEndpoint, TribunalError> {
		self.endpoints
			.get(&chain_id)
			.ok_or(TribunalError::UnsupportedChain(chain_id))
	}

	async fn rpc_request(&self, rpc_url: &str, method: &str, params: Value) -> Result<Value, TribunalError> {
		let response = self
			.client
			.post(rpc_url)
			.json(&json!({
				"jsonrpc": "2.0",
				"id": 1,
				"method": method,
				"params": params,
			}))
			.send()
			.await
			.map_err(|e| TribunalError::Rpc(format!("RPC request failed: {}", e)))?;

		let body: Value = response
			.json()
			.await
			.map_err(|e| TribunalError::Rpc(format!("Failed to parse RPC response: {}", e)))?;

		if let Some(error) = body.get("error") {
			let message = error
				.get("message")
				.and_then(|m| m.as_str())
				.unwrap_or("unknown");
			let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or(-1);
			tracing::warn!(
				"RPC {} failed: code={}, message={}",
				method,
				code,
				message
			);
			return Err(TribunalError::Rpc(format!(
				"RPC error (code {}): {}",
				code, message
			)));
		}

		body.get("result")
			.cloned()
			.ok_or_else(|| TribunalError::InvalidResponse("No result in RPC response".to_string()))
	}

	/// Twice the latest base fee, used as the explicit gas price on Base
	/// view calls.
	async fn base_gas_price(&self, rpc_url: &str) -> Result<U256, TribunalError> {
		let block = self
			.rpc_request(rpc_url, "eth_getBlockByNumber", json!(["latest", false]))
			.await?;
		let base_fee_hex = block
			.get("baseFeePerGas")
			.and_then(|v| v.as_str())
			.ok_or_else(|| {
				TribunalError::InvalidResponse("Latest block has no baseFeePerGas".to_string())
			})?;
		let base_fee = U256::from_str_radix(base_fee_hex.trim_start_matches("0x"), 16)
			.map_err(|e| {
				TribunalError::InvalidResponse(format!("Invalid baseFeePerGas '{}': {}", base_fee_hex, e))
			})?;
		Ok(base_fee * U256::from(2))
	}

	async fn eth_call(
		&self,
		chain_id: u64,
		calldata: Vec<u8>,
	) -> Result<Vec<u8>, TribunalError> {
		let endpoint = self.endpoint(chain_id)?;

		let mut call = json!({
			"to": format!("{:#x}", endpoint.tribunal),
			"data": format!("0x{}", hex::encode(&calldata)),
		});
		if chain_id == BASE_CHAIN_ID {
			let gas_price = self.base_gas_price(&endpoint.rpc_url).await?;
			call["gas"] = json!(format!("0x{:x}", BASE_CALL_GAS));
			call["gasPrice"] = json!(format!("0x{:x}", gas_price));
		}

		let result = self
			.rpc_request(&endpoint.rpc_url, "eth_call", json!([call, "latest"]))
			.await?;

		let result_hex = result
			.as_str()
			.ok_or_else(|| TribunalError::InvalidResponse("Non-string call result".to_string()))?;
		hex::decode(result_hex.trim_start_matches("0x"))
			.map_err(|e| TribunalError::InvalidResponse(format!("Invalid hex result: {}", e)))
	}
}

#[async_trait]
impl TribunalApi for RpcTribunalClient {
	async fn simulate_dispensation(
		&self,
		destination_chain_id: u64,
		claim: &TribunalClaim,
		mandate: &Mandate,
		claimant: Address,
	) -> Result<U256, TribunalError> {
		let call = ITribunal::quoteCall {
			claim: sol_claim(claim),
			mandate: sol_mandate(mandate),
			claimant,
		};

		let result = self
			.eth_call(destination_chain_id, call.abi_encode())
			.await?;
		if result.len() < 32 {
			return Err(TribunalError::InvalidResponse(format!(
				"Dispensation result too short: {} bytes",
				result.len()
			)));
		}
		Ok(U256::from_be_slice(&result[0..32]))
	}

	async fn derive_mandate_hash(
		&self,
		destination_chain_id: u64,
		mandate: &Mandate,
	) -> Result<B256, TribunalError> {
		let call = ITribunal::deriveMandateHashCall {
			mandate: sol_mandate(mandate),
		};

		let result = self
			.eth_call(destination_chain_id, call.abi_encode())
			.await?;
		if result.len() < 32 {
			return Err(TribunalError::InvalidResponse(format!(
				"Mandate hash result too short: {} bytes",
				result.len()
			)));
		}
		Ok(B256::from_slice(&result[0..32]))
	}
}

fn sol_claim(claim: &TribunalClaim) -> ITribunal::Claim {
	ITribunal::Claim {
		chainId: U256::from(claim.chain_id),
		arbiter: claim.arbiter,
		sponsor: claim.sponsor,
		nonce: U256::ZERO,
		expires: claim.expires,
		id: claim.id,
		amount: claim.amount,
	}
}

fn sol_mandate(mandate: &Mandate) -> ITribunal::Mandate {
	ITribunal::Mandate {
		chainId: mandate.chain_id,
		tribunal: mandate.tribunal,
		recipient: mandate.recipient,
		expires: mandate.expires,
		token: mandate.token,
		minimumAmount: mandate.minimum_amount,
		baselinePriorityFee: mandate.baseline_priority_fee,
		scalingFactor: mandate.scaling_factor,
		salt: mandate.salt,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_mandate() -> Mandate {
		Mandate {
			chain_id: U256::from(8453u64),
			tribunal: Address::repeat_byte(0xfa),
			recipient: Address::repeat_byte(0x77),
			expires: U256::from(1_703_023_200u64),
			token: Address::repeat_byte(0x55),
			minimum_amount: U256::from(990_000_000_000_000_000u128),
			baseline_priority_fee: U256::ZERO,
			scaling_factor: U256::from(1_000_000_000_100_000_000u128),
			salt: B256::repeat_byte(0x01),
		}
	}

	fn sample_claim() -> TribunalClaim {
		TribunalClaim {
			chain_id: 10,
			arbiter: Address::repeat_byte(0x26),
			sponsor: Address::repeat_byte(0x11),
			expires: U256::from(1_703_026_800u64),
			id: U256::from(42u64),
			amount: U256::from(10).pow(U256::from(18)),
		}
	}

	#[tokio::test]
	async fn test_unknown_chain_is_unsupported() {
		let client = RpcTribunalClient::new(HashMap::new()).unwrap();
		let err = client
			.simulate_dispensation(42161, &sample_claim(), &sample_mandate(), Address::ZERO)
			.await
			.unwrap_err();
		assert!(matches!(err, TribunalError::UnsupportedChain(42161)));
	}

	#[test]
	fn test_sol_mandate_conversion() {
		let mandate = sample_mandate();
		let sol = sol_mandate(&mandate);
		assert_eq!(sol.chainId, mandate.chain_id);
		assert_eq!(sol.tribunal, mandate.tribunal);
		assert_eq!(sol.minimumAmount, mandate.minimum_amount);
		assert_eq!(sol.salt, mandate.salt);
	}

	#[test]
	fn test_sol_claim_nonce_always_zero() {
		let sol = sol_claim(&sample_claim());
		assert_eq!(sol.nonce, U256::ZERO);
		assert_eq!(sol.chainId, U256::from(10u64));
	}

	#[test]
	fn test_quote_calldata_has_selector() {
		let call = ITribunal::quoteCall {
			claim: sol_claim(&sample_claim()),
			mandate: sol_mandate(&sample_mandate()),
			claimant: Address::repeat_byte(0x77),
		};
		let encoded = call.abi_encode();
		assert_eq!(&encoded[0..4], ITribunal::quoteCall::SELECTOR);
		// 7 claim words + 9 mandate words + claimant.
		assert_eq!(encoded.len(), 4 + 32 * 17);
	}

	#[test]
	fn test_derive_mandate_hash_calldata_has_selector() {
		let call = ITribunal::deriveMandateHashCall {
			mandate: sol_mandate(&sample_mandate()),
		};
		let encoded = call.abi_encode();
		assert_eq!(&encoded[0..4], ITribunal::deriveMandateHashCall::SELECTOR);
		assert_eq!(encoded.len(), 4 + 32 * 9);
	}
}

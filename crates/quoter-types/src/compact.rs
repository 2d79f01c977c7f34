//! Domain types for compacts, mandates and quote parameters.
//!
//! These are the validated, strongly-typed forms the pipeline works with.
//! The wire layer in [`crate::api`] translates into and out of them; nothing
//! here is serialized directly.

use alloy_primitives::{Address, B256, U256};

/// Default slippage tolerance in basis points (1%).
pub const DEFAULT_SLIPPAGE_BIPS: u16 = 100;

/// Default scaling factor applied by tribunals to priority-fee escalation.
pub const DEFAULT_SCALING_FACTOR: u128 = 1_000_000_000_100_000_000;

/// A token on a specific chain. The zero address denotes the chain's native
/// token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenRef {
	pub chain_id: u64,
	pub address: Address,
}

impl TokenRef {
	pub fn new(chain_id: u64, address: Address) -> Self {
		Self { chain_id, address }
	}

	/// Whether this is the chain's native token.
	pub fn is_native(&self) -> bool {
		self.address == Address::ZERO
	}
}

/// Decimals and symbol for a token, looked up from the oracle rather than
/// trusted from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
	pub decimals: u8,
	pub symbol: String,
}

impl TokenInfo {
	/// Metadata for a chain's native token.
	pub fn native() -> Self {
		Self {
			decimals: 18,
			symbol: "ETH".to_string(),
		}
	}
}

/// Resource-lock parameters packed into the compact id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockParameters {
	/// Allocator identifier, at most 92 bits wide.
	pub allocator_id: U256,
	/// Coarse timeout selector, 0..=7.
	pub reset_period: u8,
	/// Whether the lock is valid across chains. Packed inverted: a
	/// multichain lock has the high bit of the id cleared.
	pub is_multichain: bool,
}

impl Default for LockParameters {
	fn default() -> Self {
		Self {
			allocator_id: U256::ZERO,
			reset_period: 0,
			is_multichain: false,
		}
	}
}

/// Optional per-request quote parameters with their resolved defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteContext {
	/// Tolerated shortfall from the quoted output, in 1/10_000ths.
	pub slippage_bips: u16,
	/// Recipient of the output tokens; defaults to the sponsor.
	pub recipient: Option<Address>,
	pub baseline_priority_fee: U256,
	pub scaling_factor: U256,
	/// Unix seconds by which the fill must land.
	pub fill_expires: Option<u64>,
	/// Unix seconds by which the claim must be processed.
	pub claim_expires: Option<u64>,
}

impl Default for QuoteContext {
	fn default() -> Self {
		Self {
			slippage_bips: DEFAULT_SLIPPAGE_BIPS,
			recipient: None,
			baseline_priority_fee: U256::ZERO,
			scaling_factor: U256::from(DEFAULT_SCALING_FACTOR),
			fill_expires: None,
			claim_expires: None,
		}
	}
}

/// The destination-side parameter bundle a filler must satisfy.
///
/// Field order matches the canonical Mandate witness type; the witness hash
/// is computed over exactly these nine fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mandate {
	/// Destination chain id.
	pub chain_id: U256,
	/// Tribunal contract on the destination chain.
	pub tribunal: Address,
	pub recipient: Address,
	/// Fill deadline, unix seconds.
	pub expires: U256,
	/// Output token on the destination chain.
	pub token: Address,
	pub minimum_amount: U256,
	pub baseline_priority_fee: U256,
	pub scaling_factor: U256,
	/// 32 random bytes, fresh per request.
	pub salt: B256,
}

/// The full claim payload the sponsor signs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compact {
	/// Adjudicating contract on the source chain.
	pub arbiter: Address,
	/// Settlement contract on the destination chain.
	pub tribunal: Address,
	pub sponsor: Address,
	/// Always absent; allocators assign nonces at signing time.
	pub nonce: Option<U256>,
	/// Claim deadline, unix seconds.
	pub expires: U256,
	/// Packed compact id (lock parameters and input token).
	pub id: U256,
	/// Input amount, base units.
	pub amount: U256,
	/// Net output amount after dispensation.
	pub maximum_amount: U256,
	pub mandate: Mandate,
}

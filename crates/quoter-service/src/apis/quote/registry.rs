//! Arbiter registry for supported chain pairs.
//!
//! Centralizes knowledge about arbiter and tribunal deployments so the
//! pipeline can stay generic over chain pairs. Entries are fixed per build
//! and immutable after startup; every directed pair over the supported
//! chain set is populated.

use alloy_primitives::{Address, B256, U256};
use once_cell::sync::Lazy;
use quoter_types::{Mandate, QuoteError};
use std::collections::HashMap;

/// Global arbiter registry instance
pub static ARBITER_REGISTRY: Lazy<ArbiterRegistry> = Lazy::new(ArbiterRegistry::default);

/// Chains with arbiter and tribunal deployments.
pub const SUPPORTED_CHAINS: [u64; 4] = [1, 10, 8453, 130];

/// Witness type string shared by the current deployments. The codec never
/// assumes this shape; it parses whatever string the entry carries.
const MANDATE_WITNESS_TYPE: &str = "Mandate mandate)Mandate(uint256 chainId,address tribunal,address recipient,uint256 expires,address token,uint256 minimumAmount,uint256 baselinePriorityFee,uint256 scalingFactor,bytes32 salt)";

/// Arbiter deployments by source chain.
const ARBITER_DEPLOYMENTS: &[(u64, &str)] = &[
	(1, "0x0a1c7f5e84d3b2a9c6e8f0614d2b9a7c5e3f1008"),
	(10, "0x2602fc09ef5f6e59f80dc3acb861d415e2a0f626"),
	(8453, "0x84f2c5a6d9e8b7013a6c4d5e2f1b098a7c6d5e31"),
	(130, "0x1302ab9f8c7d6e5f4a3b2c1d0e9f8a7b6c5d4e21"),
];

/// Tribunal deployments by destination chain.
const TRIBUNAL_DEPLOYMENTS: &[(u64, &str)] = &[
	(1, "0x7b3e5d2c1a0f9e8d7c6b5a4938271605f4e3d2c9"),
	(10, "0x0f9e8d7c6b5a49382716051e2d3c4b5a69788b7a"),
	(8453, "0xfabe45cf40c7d69f10ff1c6dc51a942f66bd6c1f"),
	(130, "0x130f1e2d3c4b5a69788b7a6c5d4e3f2a1b0c9d8e"),
];

/// Everything the mandate builder needs for one request.
#[derive(Debug, Clone, Copy)]
pub struct MandateSeed {
	pub destination_chain_id: u64,
	pub tribunal: Address,
	pub recipient: Address,
	/// Fill deadline, unix seconds.
	pub fill_expires: u64,
	/// Output token on the destination chain.
	pub token: Address,
	pub minimum_amount: U256,
	pub baseline_priority_fee: U256,
	pub scaling_factor: U256,
	pub salt: B256,
}

/// Pure mandate construction function carried by each entry.
pub type MandateBuilder = fn(&MandateSeed) -> Mandate;

/// One `(source, destination)` arbiter configuration.
#[derive(Debug, Clone)]
pub struct ArbiterEntry {
	/// Adjudicating contract on the source chain.
	pub arbiter: Address,
	/// Settlement contract on the destination chain.
	pub tribunal: Address,
	pub witness_type_string: &'static str,
	pub mandate_builder: MandateBuilder,
}

/// Registry mapping directed chain pairs to arbiter configurations.
#[derive(Debug, Clone)]
pub struct ArbiterRegistry {
	entries: HashMap<(u64, u64), ArbiterEntry>,
	tribunals: HashMap<u64, Address>,
}

impl Default for ArbiterRegistry {
	fn default() -> Self {
		let arbiters: HashMap<u64, Address> = ARBITER_DEPLOYMENTS
			.iter()
			.map(|(chain_id, addr)| {
				let address = addr
					.parse()
					.unwrap_or_else(|_| panic!("Valid arbiter address: {addr}"));
				(*chain_id, address)
			})
			.collect();
		let tribunals: HashMap<u64, Address> = TRIBUNAL_DEPLOYMENTS
			.iter()
			.map(|(chain_id, addr)| {
				let address = addr
					.parse()
					.unwrap_or_else(|_| panic!("Valid tribunal address: {addr}"));
				(*chain_id, address)
			})
			.collect();

		let mut entries = HashMap::new();
		for src in SUPPORTED_CHAINS {
			for dst in SUPPORTED_CHAINS {
				if src == dst {
					continue;
				}
				entries.insert(
					(src, dst),
					ArbiterEntry {
						arbiter: arbiters[&src],
						tribunal: tribunals[&dst],
						witness_type_string: MANDATE_WITNESS_TYPE,
						mandate_builder: build_mandate,
					},
				);
			}
		}

		Self { entries, tribunals }
	}
}

impl ArbiterRegistry {
	/// Look up the arbiter configuration for a directed chain pair.
	pub fn lookup(&self, src: u64, dst: u64) -> Result<&ArbiterEntry, QuoteError> {
		self.entries
			.get(&(src, dst))
			.ok_or(QuoteError::NoArbiterForChainPair { src, dst })
	}

	/// The tribunal deployment on a destination chain, if any.
	pub fn tribunal_address(&self, chain_id: u64) -> Option<Address> {
		self.tribunals.get(&chain_id).copied()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Mandate builder shared by the current deployments.
fn build_mandate(seed: &MandateSeed) -> Mandate {
	Mandate {
		chain_id: U256::from(seed.destination_chain_id),
		tribunal: seed.tribunal,
		recipient: seed.recipient,
		expires: U256::from(seed.fill_expires),
		token: seed.token,
		minimum_amount: seed.minimum_amount,
		baseline_priority_fee: seed.baseline_priority_fee,
		scaling_factor: seed.scaling_factor,
		salt: seed.salt,
	}
}

//! Compact-id bit packing.
//!
//! A compact id is a 256-bit word carrying the resource-lock parameters and
//! the input token:
//!
//! ```text
//! bit  255       !isMultichain
//! bits 254..252  resetPeriod
//! bits 251..160  allocatorId
//! bits 159..0    input token address
//! ```
//!
//! Note the inverted top bit: a multichain lock stores 0 there.

use alloy_primitives::{Address, U256};
use quoter_types::{LockParameters, QuoteError};

/// Pack lock parameters and the input token into a compact id.
///
/// Fields wider than their bit allocation are rejected rather than masked.
pub fn pack_compact_id(lock: &LockParameters, input_token: Address) -> Result<U256, QuoteError> {
	if lock.reset_period > 7 {
		return Err(QuoteError::InvalidLockParameters(
			"Reset period must be between 0 and 7".to_string(),
		));
	}
	if lock.allocator_id.bit_len() > 92 {
		return Err(QuoteError::CompactIdFieldOverflow(
			"Allocator id must fit in 92 bits".to_string(),
		));
	}

	let mut id = U256::from_be_slice(input_token.as_slice());
	id |= lock.allocator_id << 160;
	id |= U256::from(lock.reset_period) << 252;
	if !lock.is_multichain {
		id |= U256::from(1) << 255;
	}
	Ok(id)
}

/// Unpack a compact id into `(is_multichain, reset_period, allocator_id,
/// input_token)`.
pub fn unpack_compact_id(id: U256) -> (bool, u8, U256, Address) {
	let is_multichain = !id.bit(255);
	let reset_period: u8 = ((id >> 252usize) & U256::from(0b111u32)).to::<u8>();
	let allocator_id = (id >> 160) & ((U256::from(1) << 92) - U256::from(1));

	let word = id.to_be_bytes::<32>();
	let input_token = Address::from_slice(&word[12..32]);

	(is_multichain, reset_period, allocator_id, input_token)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn lock(allocator_id: u128, reset_period: u8, is_multichain: bool) -> LockParameters {
		LockParameters {
			allocator_id: U256::from(allocator_id),
			reset_period,
			is_multichain,
		}
	}

	#[test]
	fn test_pack_unpack_roundtrip() {
		let cases = [
			(0u128, 0u8, false),
			(123, 4, true),
			(1, 7, false),
			((1u128 << 92) - 1, 7, true),
			(0xdead_beef, 3, false),
		];
		let tokens = [
			Address::ZERO,
			Address::repeat_byte(0x44),
			Address::repeat_byte(0xff),
		];

		for (allocator_id, reset_period, is_multichain) in cases {
			for token in tokens {
				let params = lock(allocator_id, reset_period, is_multichain);
				let id = pack_compact_id(&params, token).unwrap();
				let (m, r, a, t) = unpack_compact_id(id);
				assert_eq!(m, is_multichain);
				assert_eq!(r, reset_period);
				assert_eq!(a, U256::from(allocator_id));
				assert_eq!(t, token);
			}
		}
	}

	#[test]
	fn test_high_bit_is_inverted_multichain() {
		let single = pack_compact_id(&lock(0, 0, false), Address::ZERO).unwrap();
		assert!(single.bit(255));

		let multi = pack_compact_id(&lock(0, 0, true), Address::ZERO).unwrap();
		assert!(!multi.bit(255));
	}

	#[test]
	fn test_field_placement() {
		let token = Address::repeat_byte(0x55);
		let id = pack_compact_id(&lock(123, 4, true), token).unwrap();

		// Token occupies the low 160 bits untouched.
		assert_eq!(
			id & ((U256::from(1) << 160) - U256::from(1)),
			U256::from_be_slice(token.as_slice())
		);
		assert_eq!((id >> 252) & U256::from(0b111), U256::from(4));
		assert_eq!(
			(id >> 160) & ((U256::from(1) << 92) - U256::from(1)),
			U256::from(123)
		);
	}

	#[test]
	fn test_reset_period_out_of_range() {
		let err = pack_compact_id(&lock(0, 8, false), Address::ZERO).unwrap_err();
		assert!(matches!(err, QuoteError::InvalidLockParameters(_)));
		assert_eq!(err.to_string(), "Reset period must be between 0 and 7");
	}

	#[test]
	fn test_allocator_id_overflow() {
		let params = LockParameters {
			allocator_id: U256::from(1) << 92,
			reset_period: 0,
			is_multichain: false,
		};
		let err = pack_compact_id(&params, Address::ZERO).unwrap_err();
		assert!(matches!(err, QuoteError::CompactIdFieldOverflow(_)));

		// The widest legal allocator id still packs.
		let params = LockParameters {
			allocator_id: (U256::from(1) << 92) - U256::from(1),
			reset_period: 0,
			is_multichain: false,
		};
		assert!(pack_compact_id(&params, Address::ZERO).is_ok());
	}
}

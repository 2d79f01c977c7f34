//! Conversion utilities for wire-format values.
//!
//! The API carries addresses as 0x-prefixed hex and every number as a
//! base-10 string; these helpers translate between those forms and the
//! alloy primitive types used internally.

use alloy_primitives::{Address, U256};

/// Parse a 0x-prefixed hex string into an address.
///
/// Accepts any letter casing; checksums are not enforced on input.
pub fn parse_address(hex_str: &str) -> Result<Address, String> {
	hex_str
		.parse::<Address>()
		.map_err(|e| format!("Invalid address '{}': {}", hex_str, e))
}

/// Parse a base-10 string into a U256.
pub fn parse_u256_decimal(value: &str) -> Result<U256, String> {
	if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
		return Err(format!("Invalid decimal string '{}'", value));
	}
	value
		.parse::<U256>()
		.map_err(|e| format!("Invalid decimal string '{}': {}", value, e))
}

/// Parse a unix-seconds timestamp from its wire string form.
pub fn parse_unix_seconds(value: &str) -> Result<u64, String> {
	value
		.parse::<u64>()
		.map_err(|e| format!("Invalid timestamp '{}': {}", value, e))
}

/// Format an 18-decimal fixed-point USD amount as a display string with a
/// dollar sign and four decimals, e.g. `"$123.4500"`.
pub fn format_usd_display(usd_wei: U256) -> String {
	let one_ether = U256::from(10).pow(U256::from(18));
	let frac_unit = U256::from(10).pow(U256::from(14));

	let dollars = usd_wei / one_ether;
	let frac = (usd_wei % one_ether) / frac_unit;
	format!("${}.{:04}", dollars, frac.to::<u64>())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_address() {
		let addr = parse_address("0x4444444444444444444444444444444444444444").unwrap();
		assert_eq!(addr, Address::repeat_byte(0x44));

		assert!(parse_address("0x1234").is_err());
		assert!(parse_address("not-an-address").is_err());
	}

	#[test]
	fn test_parse_u256_decimal() {
		assert_eq!(
			parse_u256_decimal("1000000000000000000").unwrap(),
			U256::from(10).pow(U256::from(18))
		);
		assert_eq!(parse_u256_decimal("0").unwrap(), U256::ZERO);

		assert!(parse_u256_decimal("").is_err());
		assert!(parse_u256_decimal("0x10").is_err());
		assert!(parse_u256_decimal("-5").is_err());
		assert!(parse_u256_decimal("1.5").is_err());
	}

	#[test]
	fn test_parse_unix_seconds() {
		assert_eq!(parse_unix_seconds("1703026800").unwrap(), 1703026800);
		assert!(parse_unix_seconds("later").is_err());
	}

	#[test]
	fn test_format_usd_display() {
		// 0.05 ETH worth 2000 USD/ETH = $100 exactly.
		let usd = U256::from(100u64) * U256::from(10).pow(U256::from(18));
		assert_eq!(format_usd_display(usd), "$100.0000");

		// $1.2345678 truncates, never rounds.
		let usd = U256::from(1_234_567_800_000_000_000u128);
		assert_eq!(format_usd_display(usd), "$1.2345");

		assert_eq!(format_usd_display(U256::ZERO), "$0.0000");

		// Sub-cent value keeps its leading zeros.
		let usd = U256::from(500_000_000_000_000u64); // $0.0005
		assert_eq!(format_usd_display(usd), "$0.0005");
	}
}

//! Quote endpoint.
//!
//! Validates and translates one JSON request into a pipeline call, then
//! serializes the outcome back to the wire shape: every number a decimal
//! string, `nonce` always null, and the dispensation also rendered as a
//! four-decimal USD display string.

pub mod pipeline;
pub mod registry;
pub mod router;
pub mod tribunal;

use crate::server::AppState;
use alloy_primitives::I256;
use axum::{extract::State, Json};
use pipeline::{QuoteOutcome, ValidatedQuote};
use quoter_types::{
	format_usd_display, parse_address, parse_u256_decimal, parse_unix_seconds, ApiError,
	ArbiterData, LockParameters, MandateData, QuoteContext, QuoteError, QuoteRequest,
	QuoteResponse, QuoteResponseContext, TokenRef,
};
use tracing::info;

/// Handles `POST /quote`.
pub async fn handle_quote(
	State(state): State<AppState>,
	Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ApiError> {
	info!(
		"Processing quote request {} -> {}",
		request.input_token_chain_id, request.output_token_chain_id
	);

	let validated = validate_request(&request)?;
	let outcome = state.pipeline.run(validated).await?;
	Ok(Json(build_response(&outcome)))
}

/// Validate and translate a wire request into pipeline inputs.
pub fn validate_request(request: &QuoteRequest) -> Result<ValidatedQuote, QuoteError> {
	let sponsor = parse_address(&request.sponsor).map_err(QuoteError::InvalidRequest)?;
	let input = TokenRef::new(
		request.input_token_chain_id,
		parse_address(&request.input_token_address).map_err(QuoteError::InvalidRequest)?,
	);
	let output = TokenRef::new(
		request.output_token_chain_id,
		parse_address(&request.output_token_address).map_err(QuoteError::InvalidRequest)?,
	);
	let amount =
		parse_u256_decimal(&request.input_token_amount).map_err(QuoteError::InvalidRequest)?;

	let lock = match &request.lock_parameters {
		Some(lock) => {
			if lock.reset_period > 7 {
				return Err(QuoteError::InvalidLockParameters(
					"Reset period must be between 0 and 7".to_string(),
				));
			}
			LockParameters {
				allocator_id: parse_u256_decimal(&lock.allocator_id)
					.map_err(QuoteError::InvalidRequest)?,
				reset_period: lock.reset_period,
				is_multichain: lock.is_multichain,
			}
		},
		None => LockParameters::default(),
	};

	let context = resolve_context(request)?;
	if let (Some(fill), Some(claim)) = (context.fill_expires, context.claim_expires) {
		if fill >= claim {
			return Err(QuoteError::ExpiresOrderViolation);
		}
	}

	Ok(ValidatedQuote {
		sponsor,
		input,
		amount,
		output,
		lock,
		context,
	})
}

fn resolve_context(request: &QuoteRequest) -> Result<QuoteContext, QuoteError> {
	let mut context = QuoteContext::default();
	let Some(wire) = &request.context else {
		return Ok(context);
	};

	if let Some(bips) = wire.slippage_bips {
		context.slippage_bips = bips;
	}
	if let Some(recipient) = &wire.recipient {
		context.recipient = Some(parse_address(recipient).map_err(QuoteError::InvalidRequest)?);
	}
	if let Some(fee) = &wire.baseline_priority_fee {
		context.baseline_priority_fee =
			parse_u256_decimal(fee).map_err(QuoteError::InvalidRequest)?;
	}
	if let Some(factor) = &wire.scaling_factor {
		context.scaling_factor = parse_u256_decimal(factor).map_err(QuoteError::InvalidRequest)?;
	}
	if let Some(fill) = &wire.fill_expires {
		context.fill_expires = Some(parse_unix_seconds(fill).map_err(QuoteError::InvalidRequest)?);
	}
	if let Some(claim) = &wire.claim_expires {
		context.claim_expires =
			Some(parse_unix_seconds(claim).map_err(QuoteError::InvalidRequest)?);
	}
	Ok(context)
}

/// Serialize a pipeline outcome to the wire shape.
pub fn build_response(outcome: &QuoteOutcome) -> QuoteResponse {
	let compact = &outcome.compact;
	let mandate = &compact.mandate;

	QuoteResponse {
		data: ArbiterData {
			arbiter: compact.arbiter.to_string(),
			tribunal: compact.tribunal.to_string(),
			sponsor: compact.sponsor.to_string(),
			nonce: compact.nonce.map(|n| n.to_string()),
			expires: compact.expires.to_string(),
			id: compact.id.to_string(),
			amount: compact.amount.to_string(),
			maximum_amount: compact.maximum_amount.to_string(),
			mandate: MandateData {
				chain_id: mandate.chain_id.to_string(),
				tribunal: mandate.tribunal.to_string(),
				recipient: mandate.recipient.to_string(),
				expires: mandate.expires.to_string(),
				token: mandate.token.to_string(),
				minimum_amount: mandate.minimum_amount.to_string(),
				baseline_priority_fee: mandate.baseline_priority_fee.to_string(),
				scaling_factor: mandate.scaling_factor.to_string(),
				salt: mandate.salt.to_string(),
			},
		},
		context: QuoteResponseContext {
			dispensation: outcome.dispensation.map(|d| d.to_string()),
			dispensation_usd: outcome.dispensation_usd_wei.map(format_usd_display),
			spot_output_amount: outcome.spot.map(|s| s.to_string()),
			quote_output_amount_direct: outcome.direct.map(|d| d.to_string()),
			quote_output_amount_net: outcome.net.map(|n| n.to_string()),
			delta_amount: outcome.delta.map(|d: I256| d.to_string()),
			witness_hash: outcome.witness_hash.to_string(),
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{Address, B256, U256};
	use quoter_types::{Compact, LockParametersRequest, Mandate, QuoteContextRequest};

	fn base_request() -> QuoteRequest {
		QuoteRequest {
			sponsor: "0x1111111111111111111111111111111111111111".to_string(),
			input_token_chain_id: 10,
			input_token_address: "0x4444444444444444444444444444444444444444".to_string(),
			input_token_amount: "1000000000000000000".to_string(),
			output_token_chain_id: 8453,
			output_token_address: "0x5555555555555555555555555555555555555555".to_string(),
			lock_parameters: Some(LockParametersRequest {
				allocator_id: "123".to_string(),
				reset_period: 4,
				is_multichain: true,
			}),
			context: None,
		}
	}

	fn sample_outcome() -> QuoteOutcome {
		let mandate = Mandate {
			chain_id: U256::from(8453u64),
			tribunal: Address::repeat_byte(0xfa),
			recipient: Address::repeat_byte(0x11),
			expires: U256::from(1_703_023_200u64),
			token: Address::repeat_byte(0x55),
			minimum_amount: U256::from(990_000_000_000_000_000u128),
			baseline_priority_fee: U256::ZERO,
			scaling_factor: U256::from(1_000_000_000_100_000_000u128),
			salt: B256::repeat_byte(0xab),
		};
		QuoteOutcome {
			compact: Compact {
				arbiter: Address::repeat_byte(0x26),
				tribunal: Address::repeat_byte(0xfa),
				sponsor: Address::repeat_byte(0x11),
				nonce: None,
				expires: U256::from(1_703_026_800u64),
				id: U256::from(42u64),
				amount: U256::from(10).pow(U256::from(18)),
				maximum_amount: U256::from(950_000_000_000_000_000u128),
				mandate,
			},
			witness_hash: B256::repeat_byte(0xcd),
			spot: Some(U256::from(2u64) * U256::from(10).pow(U256::from(18))),
			direct: Some(U256::from(10).pow(U256::from(18))),
			net: Some(U256::from(950_000_000_000_000_000u128)),
			delta: Some(
				-alloy_primitives::I256::from_raw(U256::from(1_050_000_000_000_000_000u128)),
			),
			dispensation: Some(U256::from(50_000_000_000_000_000u128)),
			dispensation_usd_wei: Some(U256::from(100u64) * U256::from(10).pow(U256::from(18))),
		}
	}

	#[test]
	fn test_validate_request_defaults() {
		let validated = validate_request(&base_request()).unwrap();
		assert_eq!(validated.sponsor, Address::repeat_byte(0x11));
		assert_eq!(validated.input.chain_id, 10);
		assert_eq!(validated.output.chain_id, 8453);
		assert_eq!(validated.amount, U256::from(10).pow(U256::from(18)));
		assert_eq!(validated.lock.allocator_id, U256::from(123u64));
		assert_eq!(validated.lock.reset_period, 4);
		assert!(validated.lock.is_multichain);
		assert_eq!(validated.context.slippage_bips, 100);
	}

	#[test]
	fn test_validate_request_reset_period_out_of_range() {
		let mut request = base_request();
		request.lock_parameters.as_mut().unwrap().reset_period = 8;

		let err = validate_request(&request).unwrap_err();
		assert_eq!(err.to_string(), "Reset period must be between 0 and 7");

		let api_err: ApiError = err.into();
		assert_eq!(api_err.status_code(), 400);
	}

	#[test]
	fn test_validate_request_expires_order() {
		let mut request = base_request();
		request.context = Some(QuoteContextRequest {
			fill_expires: Some("1703026800".to_string()),
			claim_expires: Some("1703023200".to_string()),
			..QuoteContextRequest::default()
		});

		let err = validate_request(&request).unwrap_err();
		assert_eq!(err.to_string(), "fillExpires must be before claimExpires");
	}

	#[test]
	fn test_validate_request_bad_address() {
		let mut request = base_request();
		request.sponsor = "0x123".to_string();
		assert!(matches!(
			validate_request(&request),
			Err(QuoteError::InvalidRequest(_))
		));
	}

	#[test]
	fn test_validate_request_bad_amount() {
		let mut request = base_request();
		request.input_token_amount = "1.5e18".to_string();
		assert!(matches!(
			validate_request(&request),
			Err(QuoteError::InvalidRequest(_))
		));
	}

	#[test]
	fn test_validate_request_custom_context() {
		let mut request = base_request();
		request.context = Some(QuoteContextRequest {
			slippage_bips: Some(50),
			recipient: Some("0x7777777777777777777777777777777777777777".to_string()),
			baseline_priority_fee: Some("2000000000".to_string()),
			scaling_factor: Some("1000000000200000000".to_string()),
			fill_expires: None,
			claim_expires: None,
		});

		let validated = validate_request(&request).unwrap();
		assert_eq!(validated.context.slippage_bips, 50);
		assert_eq!(validated.context.recipient, Some(Address::repeat_byte(0x77)));
		assert_eq!(
			validated.context.baseline_priority_fee,
			U256::from(2_000_000_000u64)
		);
		assert_eq!(
			validated.context.scaling_factor,
			U256::from(1_000_000_000_200_000_000u128)
		);
	}

	#[test]
	fn test_build_response_wire_shape() {
		let response = build_response(&sample_outcome());
		let json = serde_json::to_value(&response).unwrap();

		assert_eq!(json["data"]["nonce"], serde_json::Value::Null);
		assert_eq!(json["data"]["amount"], "1000000000000000000");
		assert_eq!(json["data"]["maximumAmount"], "950000000000000000");
		assert_eq!(
			json["data"]["mandate"]["minimumAmount"],
			"990000000000000000"
		);
		assert_eq!(json["data"]["mandate"]["chainId"], "8453");
		assert_eq!(json["context"]["dispensation"], "50000000000000000");
		assert_eq!(json["context"]["dispensationUSD"], "$100.0000");
		assert_eq!(json["context"]["spotOutputAmount"], "2000000000000000000");
		assert_eq!(json["context"]["deltaAmount"], "-1050000000000000000");

		let witness = json["context"]["witnessHash"].as_str().unwrap();
		assert!(witness.starts_with("0x"));
		assert_eq!(witness.len(), 66);
		assert!(witness[2..].bytes().all(|b| b.is_ascii_hexdigit()));
	}

	#[test]
	fn test_build_response_partial_nulls() {
		let mut outcome = sample_outcome();
		outcome.spot = None;
		outcome.delta = None;
		outcome.dispensation_usd_wei = None;

		let json = serde_json::to_value(build_response(&outcome)).unwrap();
		assert_eq!(json["context"]["spotOutputAmount"], serde_json::Value::Null);
		assert_eq!(json["context"]["deltaAmount"], serde_json::Value::Null);
		assert_eq!(
			json["context"]["dispensationUSD"],
			serde_json::Value::Null
		);
		assert_eq!(
			json["context"]["quoteOutputAmountDirect"],
			"1000000000000000000"
		);
	}
}

//! Wire types for the quoter HTTP API.
//!
//! Request and response bodies for `POST /quote` and `GET /health`. Every
//! numeric field crosses the wire as a base-10 string so that 256-bit amounts
//! survive JSON; `nonce` is always serialized as `null`.

use crate::errors::QuoteError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request body for `POST /quote`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
	/// Account that will sign the compact, 0x-prefixed 40-hex.
	pub sponsor: String,
	pub input_token_chain_id: u64,
	pub input_token_address: String,
	/// Input amount in base units, decimal string.
	pub input_token_amount: String,
	pub output_token_chain_id: u64,
	pub output_token_address: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub lock_parameters: Option<LockParametersRequest>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub context: Option<QuoteContextRequest>,
}

/// Resource-lock parameters as they appear on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockParametersRequest {
	/// Allocator id, decimal string (at most 92 bits).
	pub allocator_id: String,
	pub reset_period: u8,
	pub is_multichain: bool,
}

/// Optional quote context as it appears on the wire. Absent fields take the
/// documented defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteContextRequest {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub slippage_bips: Option<u16>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub recipient: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub baseline_priority_fee: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scaling_factor: Option<String>,
	/// Fill deadline, unix seconds as a decimal string.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fill_expires: Option<String>,
	/// Claim deadline, unix seconds as a decimal string.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub claim_expires: Option<String>,
}

/// Response body for `POST /quote`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
	/// The signable arbiter configuration.
	pub data: ArbiterData,
	/// Pricing context around the quote.
	pub context: QuoteResponseContext,
}

/// Wire form of the compact the sponsor signs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbiterData {
	pub arbiter: String,
	pub tribunal: String,
	pub sponsor: String,
	/// Always `null`; allocators assign nonces at signing time.
	pub nonce: Option<String>,
	pub expires: String,
	pub id: String,
	pub amount: String,
	pub maximum_amount: String,
	pub mandate: MandateData,
}

/// Wire form of the mandate embedded in the compact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MandateData {
	pub chain_id: String,
	pub tribunal: String,
	pub recipient: String,
	pub expires: String,
	pub token: String,
	pub minimum_amount: String,
	pub baseline_priority_fee: String,
	pub scaling_factor: String,
	pub salt: String,
}

/// Pricing context in the quote response. Nulls mark the price sources that
/// were unavailable for this request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponseContext {
	/// Tribunal dispensation in wei, or null when the tribunal was
	/// unreachable.
	pub dispensation: Option<String>,
	/// Display string `"$X.XXXX"`, or null.
	#[serde(rename = "dispensationUSD")]
	pub dispensation_usd: Option<String>,
	pub spot_output_amount: Option<String>,
	pub quote_output_amount_direct: Option<String>,
	pub quote_output_amount_net: Option<String>,
	pub delta_amount: Option<String>,
	pub witness_hash: String,
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
	pub status: String,
	/// Unix milliseconds.
	pub timestamp: u64,
}

/// Error body returned to API callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub message: String,
}

/// HTTP-level error carrying its status code.
#[derive(Debug)]
pub enum ApiError {
	/// Validation failures and pipeline errors the caller can fix (400).
	BadRequest { message: String },
	/// Registry or encoding bugs the caller cannot fix (500).
	InternalServerError { message: String },
}

impl ApiError {
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::BadRequest { .. } => 400,
			ApiError::InternalServerError { .. } => 500,
		}
	}

	pub fn message(&self) -> &str {
		match self {
			ApiError::BadRequest { message } => message,
			ApiError::InternalServerError { message } => message,
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::BadRequest { message } => write!(f, "Bad Request: {}", message),
			ApiError::InternalServerError { message } => {
				write!(f, "Internal Server Error: {}", message)
			},
		}
	}
}

impl std::error::Error for ApiError {}

impl From<QuoteError> for ApiError {
	fn from(err: QuoteError) -> Self {
		match err {
			QuoteError::InvalidRequest(_)
			| QuoteError::InvalidLockParameters(_)
			| QuoteError::CompactIdFieldOverflow(_)
			| QuoteError::ExpiresOrderViolation
			| QuoteError::NoArbiterForChainPair { .. }
			| QuoteError::UnsupportedChain(_) => ApiError::BadRequest {
				message: err.to_string(),
			},
			QuoteError::Witness(_) | QuoteError::Internal(_) => ApiError::InternalServerError {
				message: err.to_string(),
			},
		}
	}
}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = match self.status_code() {
			400 => StatusCode::BAD_REQUEST,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		};
		let body = ErrorResponse {
			message: self.message().to_string(),
		};

		(status, Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_quote_request_deserialization() {
		let json = r#"{
			"sponsor": "0x1111111111111111111111111111111111111111",
			"inputTokenChainId": 10,
			"inputTokenAddress": "0x4444444444444444444444444444444444444444",
			"inputTokenAmount": "1000000000000000000",
			"outputTokenChainId": 8453,
			"outputTokenAddress": "0x5555555555555555555555555555555555555555",
			"lockParameters": {
				"allocatorId": "123",
				"resetPeriod": 4,
				"isMultichain": true
			},
			"context": {
				"slippageBips": 50,
				"recipient": "0x7777777777777777777777777777777777777777"
			}
		}"#;

		let request: QuoteRequest = serde_json::from_str(json).unwrap();
		assert_eq!(request.input_token_chain_id, 10);
		assert_eq!(request.output_token_chain_id, 8453);
		assert_eq!(request.input_token_amount, "1000000000000000000");

		let lock = request.lock_parameters.unwrap();
		assert_eq!(lock.allocator_id, "123");
		assert_eq!(lock.reset_period, 4);
		assert!(lock.is_multichain);

		let context = request.context.unwrap();
		assert_eq!(context.slippage_bips, Some(50));
		assert!(context.fill_expires.is_none());
	}

	#[test]
	fn test_nonce_serializes_as_null() {
		let data = ArbiterData {
			arbiter: "0xaa".to_string(),
			tribunal: "0xbb".to_string(),
			sponsor: "0xcc".to_string(),
			nonce: None,
			expires: "1".to_string(),
			id: "2".to_string(),
			amount: "3".to_string(),
			maximum_amount: "4".to_string(),
			mandate: MandateData {
				chain_id: "8453".to_string(),
				tribunal: "0xbb".to_string(),
				recipient: "0xdd".to_string(),
				expires: "5".to_string(),
				token: "0xee".to_string(),
				minimum_amount: "6".to_string(),
				baseline_priority_fee: "0".to_string(),
				scaling_factor: "1000000000100000000".to_string(),
				salt: "0x00".to_string(),
			},
		};

		let json = serde_json::to_string(&data).unwrap();
		assert!(json.contains("\"nonce\":null"));
	}

	#[test]
	fn test_response_context_null_prices() {
		let context = QuoteResponseContext {
			dispensation: None,
			dispensation_usd: None,
			spot_output_amount: None,
			quote_output_amount_direct: Some("1000000000000000000".to_string()),
			quote_output_amount_net: Some("950000000000000000".to_string()),
			delta_amount: None,
			witness_hash: "0xabcd".to_string(),
		};

		let json = serde_json::to_string(&context).unwrap();
		assert!(json.contains("\"spotOutputAmount\":null"));
		assert!(json.contains("\"deltaAmount\":null"));
		assert!(json.contains("\"dispensationUSD\":null"));
		assert!(json.contains("\"quoteOutputAmountDirect\":\"1000000000000000000\""));
	}

	#[test]
	fn test_api_error_mapping() {
		let err: ApiError = QuoteError::NoArbiterForChainPair { src: 10, dst: 42161 }.into();
		assert_eq!(err.status_code(), 400);
		assert_eq!(err.message(), "No arbiter found for chain pair 10-42161");

		let err: ApiError =
			QuoteError::InvalidLockParameters("Reset period must be between 0 and 7".into()).into();
		assert_eq!(err.status_code(), 400);
		assert_eq!(err.message(), "Reset period must be between 0 and 7");

		let err: ApiError = QuoteError::Internal("registry".into()).into();
		assert_eq!(err.status_code(), 500);
	}
}

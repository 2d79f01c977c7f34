//! Error taxonomy for the quote pipeline and its components.
//!
//! Each component layer has its own error enum; the pipeline decides which
//! failures degrade to partial results and which surface to the caller as
//! [`QuoteError`]. Missing spot prices and missing routes are the normal
//! mode of partial success, never endpoint failures.

use thiserror::Error;

/// Errors raised by the USD price oracle.
#[derive(Debug, Error)]
pub enum OracleError {
	/// The chain has no oracle platform mapping.
	#[error("Unsupported chain: {0}")]
	UnsupportedChain(u64),
	/// Transport or API-layer failure; the pipeline treats this as
	/// "no spot price".
	#[error("Oracle unavailable: {0}")]
	Unavailable(String),
	/// The oracle answered with data we could not interpret.
	#[error("Invalid oracle data: {0}")]
	InvalidData(String),
}

/// Errors raised by the route quoter.
#[derive(Debug, Error)]
pub enum RouterError {
	/// Transport or API-layer failure; the pipeline degrades to a
	/// route-less response.
	#[error("Router unavailable: {0}")]
	Unavailable(String),
	/// The bridge dispensation consumes the entire intermediate leg.
	#[error("Dispensation exceeds intermediate amount")]
	DispensationExceedsIntermediate,
	/// The router answered with data we could not interpret.
	#[error("Invalid router response: {0}")]
	InvalidResponse(String),
}

/// Errors raised by the tribunal RPC client.
#[derive(Debug, Error)]
pub enum TribunalError {
	/// No tribunal deployment is known for the chain.
	#[error("No tribunal configured for chain {0}")]
	UnsupportedChain(u64),
	/// Transport failure or a JSON-RPC error object.
	#[error("Tribunal RPC error: {0}")]
	Rpc(String),
	/// The view call returned data we could not decode.
	#[error("Invalid tribunal response: {0}")]
	InvalidResponse(String),
}

/// Errors raised while parsing or encoding a witness type string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WitnessError {
	/// The type string does not satisfy the witness grammar.
	#[error("Invalid witness type string: {0}")]
	Parse(String),
	/// A declared parameter has no value in the mandate.
	#[error("Missing witness field: {0}")]
	MissingField(String),
}

/// Errors surfaced to the API caller.
#[derive(Debug, Error)]
pub enum QuoteError {
	/// Malformed addresses, amounts or other schema-level problems.
	#[error("{0}")]
	InvalidRequest(String),
	/// Lock parameters outside their documented ranges.
	#[error("{0}")]
	InvalidLockParameters(String),
	/// A compact-id field wider than its bit allocation.
	#[error("{0}")]
	CompactIdFieldOverflow(String),
	#[error("fillExpires must be before claimExpires")]
	ExpiresOrderViolation,
	/// No arbiter deployment covers the requested chain pair.
	#[error("No arbiter found for chain pair {src}-{dst}")]
	NoArbiterForChainPair { src: u64, dst: u64 },
	/// The request's chain is not covered by the oracle and no other
	/// signal is available.
	#[error("Unsupported chain: {0}")]
	UnsupportedChain(u64),
	/// A registry entry carries a malformed witness type string.
	#[error(transparent)]
	Witness(#[from] WitnessError),
	#[error("Internal error: {0}")]
	Internal(String),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_no_arbiter_message() {
		let err = QuoteError::NoArbiterForChainPair { src: 10, dst: 42161 };
		assert_eq!(err.to_string(), "No arbiter found for chain pair 10-42161");
	}

	#[test]
	fn test_expires_order_message() {
		assert_eq!(
			QuoteError::ExpiresOrderViolation.to_string(),
			"fillExpires must be before claimExpires"
		);
	}

	#[test]
	fn test_witness_error_into_quote_error() {
		let err: QuoteError = WitnessError::MissingField("salt".to_string()).into();
		assert!(matches!(err, QuoteError::Witness(_)));
		assert_eq!(err.to_string(), "Missing witness field: salt");
	}
}

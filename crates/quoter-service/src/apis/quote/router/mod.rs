//! Indicative route quoting.
//!
//! The router exposes one primitive, a single-chain exact-input leg, and
//! this module composes legs into same-chain and cross-chain quotes. Cross
//! chain routing goes through the native token on each side: the input leg
//! sells into native on the source chain, the bridge dispensation is paid in
//! native, and the output leg buys the output token on the destination
//! chain.

pub mod uniswap;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use quoter_types::{RouterError, TokenRef};
use std::sync::Arc;
use tracing::debug;

/// A single exact-input swap leg on one chain. The zero address denotes the
/// chain's native token.
#[async_trait]
pub trait RouterApi: Send + Sync {
	async fn leg(
		&self,
		chain_id: u64,
		token_in: Address,
		token_out: Address,
		amount_in: U256,
	) -> Result<U256, RouterError>;
}

/// Shape of the route backing a quote, recorded so the net leg can be
/// re-run without repeating the input side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
	SameChain,
	CrossChain { native_in: bool, native_out: bool },
}

/// An indicative routed quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteQuote {
	/// Output amount ignoring dispensation.
	pub direct: U256,
	/// Output amount after subtracting the dispensation from the
	/// intermediate leg. Always `<= direct`.
	pub net: U256,
	/// Native-token amount entering the destination side; the quantity the
	/// dispensation is subtracted from.
	pub intermediate: U256,
	pub kind: RouteKind,
}

/// Composes router legs into routed quotes.
#[derive(Clone)]
pub struct RouteQuoter {
	api: Arc<dyn RouterApi>,
}

impl RouteQuoter {
	pub fn new(api: Arc<dyn RouterApi>) -> Self {
		Self { api }
	}

	/// Quote `amount_in` of the input token into the output token. A
	/// non-zero `dispensation` is subtracted from the intermediate native
	/// leg before the net output is quoted.
	pub async fn quote(
		&self,
		input: &TokenRef,
		output: &TokenRef,
		amount_in: U256,
		dispensation: U256,
	) -> Result<RouteQuote, RouterError> {
		if input.chain_id == output.chain_id {
			let out = self
				.api
				.leg(input.chain_id, input.address, output.address, amount_in)
				.await?;
			return Ok(RouteQuote {
				direct: out,
				net: out,
				intermediate: out,
				kind: RouteKind::SameChain,
			});
		}

		let native_in = input.is_native();
		let native_out = output.is_native();

		let intermediate = if native_in {
			amount_in
		} else {
			self.api
				.leg(input.chain_id, input.address, Address::ZERO, amount_in)
				.await?
		};

		let direct = if native_out {
			intermediate
		} else {
			self.api
				.leg(output.chain_id, Address::ZERO, output.address, intermediate)
				.await?
		};

		let quote = RouteQuote {
			direct,
			net: direct,
			intermediate,
			kind: RouteKind::CrossChain {
				native_in,
				native_out,
			},
		};

		if dispensation.is_zero() {
			return Ok(quote);
		}

		let net = self.net_leg(&quote, output, dispensation).await?;
		debug!(
			"Routed quote: direct={}, net={}, intermediate={}, dispensation={}",
			quote.direct, net, quote.intermediate, dispensation
		);
		Ok(RouteQuote { net, ..quote })
	}

	/// Re-run only the output side of an existing quote with the
	/// dispensation subtracted from the intermediate amount.
	pub async fn net_leg(
		&self,
		quote: &RouteQuote,
		output: &TokenRef,
		dispensation: U256,
	) -> Result<U256, RouterError> {
		match quote.kind {
			// Same-chain swaps carry no bridge leg to pay from.
			RouteKind::SameChain => Ok(quote.direct),
			RouteKind::CrossChain { native_out, .. } => {
				if dispensation >= quote.intermediate {
					return Err(RouterError::DispensationExceedsIntermediate);
				}
				let reduced = quote.intermediate - dispensation;
				if native_out {
					Ok(reduced)
				} else {
					self.api
						.leg(output.chain_id, Address::ZERO, output.address, reduced)
						.await
				}
			},
		}
	}
}

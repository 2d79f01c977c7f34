//! Quote pipeline.
//!
//! Orchestrates the oracle, router, tribunal, registry and EIP-712 codecs
//! into one quote: spot reference pricing, two-phase dispensation discovery,
//! net-amount adjustment, and assembly of the signable compact with its
//! witness hash.
//!
//! Partial success is the normal mode. A missing spot price or a missing
//! route degrades the corresponding response fields to null; only invalid
//! inputs, an unknown chain pair, or an oracle-unsupported chain with no
//! other signal fail the request.

use crate::apis::quote::registry::{ArbiterRegistry, MandateSeed, ARBITER_REGISTRY};
use crate::apis::quote::router::RouteQuoter;
use crate::apis::quote::tribunal::{TribunalApi, TribunalClaim};
use crate::eip712::{mandate_witness_values, pack_compact_id, WitnessType};
use alloy_primitives::{Address, B256, I256, U256};
use quoter_pricing::UsdOracle;
use quoter_types::{
	Compact, LockParameters, OracleError, QuoteContext, QuoteError, RouterError, TokenRef,
};
use rand::RngCore;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Default window applied when the client supplies no deadlines: the fill
/// closes an hour out and the claim an hour after that.
const DEFAULT_EXPIRY_WINDOW_SECS: u64 = 3600;

/// A fully validated quote request.
#[derive(Debug, Clone)]
pub struct ValidatedQuote {
	pub sponsor: Address,
	pub input: TokenRef,
	pub amount: U256,
	pub output: TokenRef,
	pub lock: LockParameters,
	pub context: QuoteContext,
}

/// Everything the API layer needs to render a quote response.
#[derive(Debug, Clone)]
pub struct QuoteOutcome {
	pub compact: Compact,
	pub witness_hash: B256,
	pub spot: Option<U256>,
	pub direct: Option<U256>,
	pub net: Option<U256>,
	pub delta: Option<I256>,
	/// Final dispensation in wei.
	pub dispensation: Option<U256>,
	/// Dispensation in 18-decimal USD, display only.
	pub dispensation_usd_wei: Option<U256>,
}

/// The quote pipeline. Shared across requests; all per-request state lives
/// on the stack of [`QuotePipeline::run`].
pub struct QuotePipeline {
	oracle: Arc<dyn UsdOracle>,
	routes: RouteQuoter,
	tribunal: Arc<dyn TribunalApi>,
	registry: &'static ArbiterRegistry,
}

impl QuotePipeline {
	pub fn new(
		oracle: Arc<dyn UsdOracle>,
		routes: RouteQuoter,
		tribunal: Arc<dyn TribunalApi>,
	) -> Self {
		Self {
			oracle,
			routes,
			tribunal,
			registry: &ARBITER_REGISTRY,
		}
	}

	pub async fn run(&self, request: ValidatedQuote) -> Result<QuoteOutcome, QuoteError> {
		let ValidatedQuote {
			sponsor,
			input,
			amount,
			output,
			lock,
			context,
		} = request;

		// Fail fast on the conditions no amount of degradation can fix.
		let entry = self.registry.lookup(input.chain_id, output.chain_id)?;
		let id = pack_compact_id(&lock, input.address)?;
		let (fill_expires, claim_expires) = resolve_expiries(&context)?;

		// Spot reference: token metadata and USD prices, legs in parallel.
		let mut unsupported_oracle_chain = None;
		let spot = match self.spot_output(&input, &output, amount).await {
			Ok(spot) => spot,
			Err(OracleError::UnsupportedChain(chain_id)) => {
				unsupported_oracle_chain = Some(chain_id);
				None
			},
			Err(e) => {
				warn!("Spot price unavailable: {}", e);
				None
			},
		};

		// Direct routed quote.
		let route = match self.routes.quote(&input, &output, amount, U256::ZERO).await {
			Ok(route) => Some(route),
			Err(e) => {
				warn!("Route unavailable: {}", e);
				None
			},
		};

		// With no route and no oracle coverage of the request's chain,
		// there is nothing left to answer with.
		if route.is_none() && spot.is_none() {
			if let Some(chain_id) = unsupported_oracle_chain {
				return Err(QuoteError::UnsupportedChain(chain_id));
			}
		}

		let direct = route.as_ref().map(|r| r.direct);
		let recipient = context.recipient.unwrap_or(sponsor);
		let salt = random_salt();

		let seed = MandateSeed {
			destination_chain_id: output.chain_id,
			tribunal: entry.tribunal,
			recipient,
			fill_expires,
			token: output.address,
			minimum_amount: minimum_amount(direct.unwrap_or_default(), context.slippage_bips),
			baseline_priority_fee: context.baseline_priority_fee,
			scaling_factor: context.scaling_factor,
			salt,
		};
		let mandate = (entry.mandate_builder)(&seed);
		let claim = TribunalClaim {
			chain_id: input.chain_id,
			arbiter: entry.arbiter,
			sponsor,
			expires: U256::from(claim_expires),
			id,
			amount,
		};

		// Two-phase dispensation discovery against the provisional mandate,
		// then against the net-sized claim.
		let mut net = direct;
		let mut dispensation = None;
		if let Some(route_quote) = &route {
			match self
				.tribunal
				.simulate_dispensation(output.chain_id, &claim, &mandate, recipient)
				.await
			{
				Ok(phase_one) => {
					let net_amount = if phase_one.is_zero() {
						route_quote.direct
					} else {
						match self.routes.net_leg(route_quote, &output, phase_one).await {
							Ok(n) => n,
							Err(RouterError::DispensationExceedsIntermediate) => {
								debug!(
									"Dispensation {} consumes intermediate {}",
									phase_one, route_quote.intermediate
								);
								U256::ZERO
							},
							Err(e) => {
								warn!("Net leg unavailable, keeping direct: {}", e);
								route_quote.direct
							},
						}
					};
					net = Some(net_amount);

					let refined_seed = MandateSeed {
						minimum_amount: minimum_amount(net_amount, context.slippage_bips),
						..seed
					};
					let refined = (entry.mandate_builder)(&refined_seed);
					let phase_two = match self
						.tribunal
						.simulate_dispensation(output.chain_id, &claim, &refined, recipient)
						.await
					{
						Ok(d) => d,
						Err(e) => {
							warn!("Phase-two dispensation failed, keeping phase one: {}", e);
							phase_one
						},
					};
					dispensation = Some(phase_two);
				},
				Err(e) => {
					warn!("Tribunal unavailable: {}", e);
				},
			}
		}

		let delta = match (net.or(direct), spot) {
			(Some(quoted), Some(spot)) => Some(signed_delta(quoted, spot)),
			_ => None,
		};

		let dispensation_usd_wei = match dispensation {
			Some(d) => self.dispensation_usd(d).await,
			None => None,
		};

		let compact = Compact {
			arbiter: entry.arbiter,
			tribunal: entry.tribunal,
			sponsor,
			nonce: None,
			expires: U256::from(claim_expires),
			id,
			amount,
			maximum_amount: net.unwrap_or_default(),
			mandate,
		};

		let witness_type = WitnessType::parse(entry.witness_type_string)?;
		let witness_hash = witness_type.struct_hash(&mandate_witness_values(&compact.mandate))?;

		Ok(QuoteOutcome {
			compact,
			witness_hash,
			spot,
			direct,
			net,
			delta,
			dispensation,
			dispensation_usd_wei,
		})
	}

	/// Spot output amount from two independent USD prices, or `None` when
	/// the formula would overflow.
	async fn spot_output(
		&self,
		input: &TokenRef,
		output: &TokenRef,
		amount: U256,
	) -> Result<Option<U256>, OracleError> {
		let (input_info, output_info) = tokio::join!(
			self.oracle.token_info(input.chain_id, input.address),
			self.oracle.token_info(output.chain_id, output.address),
		);
		let (input_info, output_info) = (input_info?, output_info?);

		let (input_price, output_price) = tokio::join!(
			self.oracle.usd_price_wei(input.chain_id, input.address),
			self.oracle.usd_price_wei(output.chain_id, output.address),
		);
		let (input_price, output_price) = (input_price?, output_price?);

		Ok(compute_spot(
			amount,
			input_info.decimals,
			output_info.decimals,
			input_price,
			output_price,
		))
	}

	/// Dispensation in 18-decimal USD via the mainnet ETH price. Display
	/// only; failures degrade to null.
	async fn dispensation_usd(&self, dispensation: U256) -> Option<U256> {
		match self.oracle.usd_price_wei(1, Address::ZERO).await {
			Ok(eth_usd) => dispensation
				.checked_mul(eth_usd)
				.map(|product| product / U256::from(10).pow(U256::from(18))),
			Err(e) => {
				warn!("ETH USD price unavailable for display: {}", e);
				None
			},
		}
	}
}

/// Resolve fill and claim deadlines, defaulting each relative to the other.
fn resolve_expiries(context: &QuoteContext) -> Result<(u64, u64), QuoteError> {
	let now = now_secs();
	let fill_expires = context.fill_expires.unwrap_or_else(|| {
		context
			.claim_expires
			.map(|claim| claim.saturating_sub(DEFAULT_EXPIRY_WINDOW_SECS))
			.unwrap_or(now + DEFAULT_EXPIRY_WINDOW_SECS)
	});
	let claim_expires = context
		.claim_expires
		.unwrap_or(fill_expires + DEFAULT_EXPIRY_WINDOW_SECS);

	if fill_expires >= claim_expires {
		return Err(QuoteError::ExpiresOrderViolation);
	}
	Ok((fill_expires, claim_expires))
}

/// `direct * (10000 - bips) / 10000`, saturating the bips at full slippage.
pub(crate) fn minimum_amount(amount: U256, slippage_bips: u16) -> U256 {
	let retained = 10_000u16.saturating_sub(slippage_bips);
	amount * U256::from(retained) / U256::from(10_000u16)
}

/// `floor(amount * p_in * 10^d_out / (10^d_in * p_out))`, `None` on
/// overflow or an unpriced output.
fn compute_spot(
	amount: U256,
	input_decimals: u8,
	output_decimals: u8,
	input_price_wei: U256,
	output_price_wei: U256,
) -> Option<U256> {
	if output_price_wei.is_zero() {
		return None;
	}
	let numerator = amount
		.checked_mul(input_price_wei)?
		.checked_mul(U256::from(10).pow(U256::from(output_decimals)))?;
	let denominator = U256::from(10)
		.pow(U256::from(input_decimals))
		.checked_mul(output_price_wei)?;
	Some(numerator / denominator)
}

/// Signed difference `quoted - spot`.
fn signed_delta(quoted: U256, spot: U256) -> I256 {
	if quoted >= spot {
		I256::from_raw(quoted - spot)
	} else {
		-I256::from_raw(spot - quoted)
	}
}

/// 32 cryptographically random bytes, fresh per request.
fn random_salt() -> B256 {
	let mut salt = [0u8; 32];
	rand::rngs::OsRng.fill_bytes(&mut salt);
	B256::from(salt)
}

fn now_secs() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.unwrap()
		.as_secs()
}

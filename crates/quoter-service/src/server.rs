//! HTTP server for the quoter API.
//!
//! Wires the production components (CoinGecko oracle, Uniswap router,
//! JSON-RPC tribunal clients) into the quote pipeline and serves the two
//! endpoints behind a permissive CORS layer.

use crate::apis::health::handle_health;
use crate::apis::quote::handle_quote;
use crate::apis::quote::pipeline::QuotePipeline;
use crate::apis::quote::registry::ARBITER_REGISTRY;
use crate::apis::quote::router::{uniswap::UniswapRouterApi, RouteQuoter};
use crate::apis::quote::tribunal::{RpcTribunalClient, TribunalEndpoint};
use crate::config::Config;
use axum::{
	routing::{get, post},
	Router,
};
use quoter_pricing::CoinGeckoOracle;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	pub pipeline: Arc<QuotePipeline>,
}

/// Starts the HTTP server for the quoter API.
pub async fn start_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
	let oracle = Arc::new(CoinGeckoOracle::new(
		config.coingecko_api_key.clone(),
		config.price_cache_seconds,
	)?);

	// Warm the platform list; losing it only delays the first request.
	if let Err(e) = oracle.platforms().await {
		tracing::warn!("Could not prefetch oracle platforms: {}", e);
	}

	let router_api = Arc::new(UniswapRouterApi::new(config.uniswap_api_key.clone())?);
	let routes = RouteQuoter::new(router_api);

	let mut endpoints = HashMap::new();
	for (chain_id, rpc_url) in &config.rpc_urls {
		if let Some(tribunal) = ARBITER_REGISTRY.tribunal_address(*chain_id) {
			endpoints.insert(
				*chain_id,
				TribunalEndpoint {
					rpc_url: rpc_url.clone(),
					tribunal,
				},
			);
		}
	}
	let tribunal = Arc::new(RpcTribunalClient::new(endpoints)?);

	let state = AppState {
		pipeline: Arc::new(QuotePipeline::new(oracle, routes, tribunal)),
	};

	let app = Router::new()
		.route("/quote", post(handle_quote))
		.route("/health", get(handle_health))
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(state);

	let bind_address = format!("{}:{}", config.host, config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Quoter API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

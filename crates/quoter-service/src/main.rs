//! Main entry point for the quoter service.
//!
//! # Usage
//!
//! ```bash
//! export ETHEREUM_RPC_URL="https://..."
//! export OPTIMISM_RPC_URL="https://..."
//! export BASE_RPC_URL="https://..."
//! export UNICHAIN_RPC_URL="https://..."
//! # optional:
//! export COINGECKO_API_KEY="..."
//! export UNISWAP_API_KEY="..."
//! quoter
//! ```

use clap::Parser;
use quoter_service::{config::Config, server};

/// Command-line arguments for the quoter service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	/// Bind address, overriding the HOST environment variable
	#[arg(long)]
	host: Option<String>,

	/// Bind port, overriding the PORT environment variable
	#[arg(long)]
	port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(args.log_level.clone()));

	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.init();

	let mut config = Config::from_env()?;
	if let Some(host) = args.host {
		config.host = host;
	}
	if let Some(port) = args.port {
		config.port = port;
	}
	tracing::info!(
		"Loaded configuration for {} chains",
		config.rpc_urls.len()
	);

	server::start_server(config).await
}

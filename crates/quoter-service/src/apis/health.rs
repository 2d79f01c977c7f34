//! Health check endpoint.
//!
//! # Endpoints
//!
//! - `GET /health` - Liveness probe with the server's clock

use axum::Json;
use quoter_types::HealthResponse;
use std::time::{SystemTime, UNIX_EPOCH};

/// GET /health - liveness probe.
///
/// # Response
///
/// ```json
/// {"status": "ok", "timestamp": 1703023200123}
/// ```
pub async fn handle_health() -> Json<HealthResponse> {
	Json(HealthResponse {
		status: "ok".to_string(),
		timestamp: now_millis(),
	})
}

fn now_millis() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.unwrap()
		.as_millis() as u64
}

//! API Routes
//!
//! Configures the Axum router with all price service endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    all_prices_handler, create_price_handler, health_handler, instrument_prices_handler,
    price_stream_handler, vendor_prices_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /price` - Submit a new price
/// - `GET /price` - All current prices
/// - `GET /price/stream` - Server-sent events feed of accepted prices
/// - `GET /vendor/:id/prices` - Current prices from one vendor
/// - `GET /instrument/:symbol/prices` - Current prices for one instrument
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/price", get(all_prices_handler).post(create_price_handler))
        .route("/price/stream", get(price_stream_handler))
        .route("/vendor/:id/prices", get(vendor_prices_handler))
        .route("/instrument/:symbol/prices", get(instrument_prices_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

//! API Module
//!
//! HTTP handlers and routing for the price service REST API.
//!
//! # Endpoints
//! - `POST /price` - Submit a new price
//! - `GET /price` - All current prices
//! - `GET /price/stream` - Server-sent events feed of accepted prices
//! - `GET /vendor/:id/prices` - Current prices from one vendor
//! - `GET /instrument/:symbol/prices` - Current prices for one instrument
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;

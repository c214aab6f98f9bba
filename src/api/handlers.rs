//! API Handlers
//!
//! HTTP request handlers for each price service endpoint.

use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use tokio_stream::{wrappers::errors::BroadcastStreamRecvError, wrappers::BroadcastStream};
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::config::{CacheMode, Config};
use crate::error::Result;
use crate::models::{HealthResponse, NewPriceRequest, VendorInstrumentPrice};
use crate::service::{
    FilteringTradePriceService, IndexedCacheTradePriceService, PricePublisher,
    PublishingTradePriceService, TradePriceService,
};

/// Application state shared across all handlers and background tasks.
#[derive(Clone)]
pub struct AppState {
    /// Price store, already wrapped with publishing
    pub service: Arc<dyn TradePriceService>,
    /// Outbound feed of accepted prices
    pub publisher: PricePublisher,
}

impl AppState {
    /// Creates an AppState over `service`, publishing through `publisher`.
    pub fn new<S>(service: S, publisher: PricePublisher) -> Self
    where
        S: TradePriceService + 'static,
    {
        Self {
            service: Arc::new(PublishingTradePriceService::new(service, publisher.clone())),
            publisher,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Selects the price store named by `cache_mode`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let publisher = PricePublisher::new(config.publish_capacity);
        Ok(match config.cache_mode {
            CacheMode::Indexed => Self::new(IndexedCacheTradePriceService::new()?, publisher),
            CacheMode::Filtered => Self::new(FilteringTradePriceService::new(), publisher),
        })
    }
}

/// Orders prices by vendor then instrument for stable responses.
fn sorted(prices: HashSet<VendorInstrumentPrice>) -> Vec<VendorInstrumentPrice> {
    let mut prices: Vec<_> = prices.into_iter().collect();
    prices.sort_by(|a, b| {
        (a.vendor.id, &a.instrument.symbol).cmp(&(b.vendor.id, &b.instrument.symbol))
    });
    prices
}

/// Handler for POST /price
///
/// Validates and stores a new price, replacing any previous quote from the
/// same vendor for the same instrument.
pub async fn create_price_handler(
    State(state): State<AppState>,
    Json(req): Json<NewPriceRequest>,
) -> Result<StatusCode> {
    let price = req.into_price()?;
    debug!(
        "New price {}/{}: bid={} ask={}",
        price.vendor.id, price.instrument.symbol, price.bid, price.ask
    );
    state.service.create_or_update(price);

    Ok(StatusCode::ACCEPTED)
}

/// Handler for GET /price
pub async fn all_prices_handler(State(state): State<AppState>) -> Json<Vec<VendorInstrumentPrice>> {
    Json(sorted(state.service.get_all()))
}

/// Handler for GET /vendor/:id/prices
pub async fn vendor_prices_handler(
    State(state): State<AppState>,
    Path(vendor_id): Path<u64>,
) -> Result<Json<Vec<VendorInstrumentPrice>>> {
    let prices = state.service.get_by_vendor(vendor_id)?;
    Ok(Json(sorted(prices)))
}

/// Handler for GET /instrument/:symbol/prices
pub async fn instrument_prices_handler(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Vec<VendorInstrumentPrice>>> {
    let prices = state.service.get_by_instrument(&symbol)?;
    Ok(Json(sorted(prices)))
}

/// Handler for GET /price/stream
///
/// Server-sent events, one `price` event per accepted price. Slow clients
/// skip what they missed.
pub async fn price_stream_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.publisher.subscribe()).filter_map(|msg| match msg {
        Ok(price) => Event::default().event("price").json_data(&price).ok().map(Ok),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            warn!("Price stream subscriber lagged, skipped {} prices", skipped);
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.service.len()))
}

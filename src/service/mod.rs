//! Price Service Module
//!
//! The operations the API and ingestion flows call, with interchangeable
//! backing stores and a publishing decorator.
//!
//! # Implementations
//! - `IndexedCacheTradePriceService`: indexed cache, O(1) lookups
//! - `FilteringTradePriceService`: single map, scan-and-filter lookups
//! - `PublishingTradePriceService`: broadcasts accepted prices downstream

mod filtering;
mod indexed;
mod publishing;

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::VendorInstrumentPrice;

pub use filtering::FilteringTradePriceService;
pub use indexed::{IndexedCacheTradePriceService, PriceKey};
pub use publishing::{PricePublisher, PublishingTradePriceService};

// == Trade Price Service ==
/// Latest-price store shared by every request and background task.
pub trait TradePriceService: Send + Sync {
    /// Stores `price`, replacing the previous quote for the same vendor and instrument.
    fn create_or_update(&self, price: VendorInstrumentPrice);

    /// Returns every current price quoted by `vendor_id`.
    fn get_by_vendor(&self, vendor_id: u64) -> Result<HashSet<VendorInstrumentPrice>>;

    /// Returns every current price for the instrument `symbol`.
    fn get_by_instrument(&self, symbol: &str) -> Result<HashSet<VendorInstrumentPrice>>;

    /// Returns every current price.
    fn get_all(&self) -> HashSet<VendorInstrumentPrice>;

    /// Removes prices quoted before `cutoff`, returning how many were removed.
    fn expire_older_than(&self, cutoff: DateTime<Utc>) -> usize;

    /// Number of prices currently held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

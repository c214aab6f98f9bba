//! Publishing decorator
//!
//! Broadcasts every accepted price to downstream subscribers after it has
//! been stored. Delivery is fire-and-forget.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::Result;
use crate::models::VendorInstrumentPrice;
use crate::service::TradePriceService;

// == Price Publisher ==
/// Outbound channel for newly stored prices.
#[derive(Debug, Clone)]
pub struct PricePublisher {
    sender: broadcast::Sender<VendorInstrumentPrice>,
}

impl PricePublisher {
    /// Creates a publisher buffering up to `capacity` prices per slow subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Sends `price` to current subscribers; dropped if there are none.
    pub fn publish(&self, price: VendorInstrumentPrice) {
        if let Err(broadcast::error::SendError(price)) = self.sender.send(price) {
            debug!(
                "No subscribers for price {}/{}",
                price.vendor.id, price.instrument.symbol
            );
        }
    }

    /// Subscribes to prices published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<VendorInstrumentPrice> {
        self.sender.subscribe()
    }
}

// == Publishing Trade Price Service ==
/// Wraps a [`TradePriceService`], publishing each price after the delegate stores it.
pub struct PublishingTradePriceService<S> {
    delegate: S,
    publisher: PricePublisher,
}

impl<S: TradePriceService> PublishingTradePriceService<S> {
    pub fn new(delegate: S, publisher: PricePublisher) -> Self {
        Self {
            delegate,
            publisher,
        }
    }
}

impl<S: TradePriceService> TradePriceService for PublishingTradePriceService<S> {
    fn create_or_update(&self, price: VendorInstrumentPrice) {
        self.delegate.create_or_update(price.clone());
        self.publisher.publish(price);
    }

    fn get_by_vendor(&self, vendor_id: u64) -> Result<HashSet<VendorInstrumentPrice>> {
        self.delegate.get_by_vendor(vendor_id)
    }

    fn get_by_instrument(&self, symbol: &str) -> Result<HashSet<VendorInstrumentPrice>> {
        self.delegate.get_by_instrument(symbol)
    }

    fn get_all(&self) -> HashSet<VendorInstrumentPrice> {
        self.delegate.get_all()
    }

    fn expire_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        self.delegate.expire_older_than(cutoff)
    }

    fn len(&self) -> usize {
        self.delegate.len()
    }
}

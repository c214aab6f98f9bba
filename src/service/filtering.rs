//! Scan-and-filter price service
//!
//! Keeps one concurrent map of prices and answers every query by filtering
//! all of them. Simpler than the indexed cache, linear per lookup.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::error::Result;
use crate::models::VendorInstrumentPrice;
use crate::service::TradePriceService;

// == Filtering Trade Price Service ==
#[derive(Debug, Default)]
pub struct FilteringTradePriceService {
    prices: DashMap<VendorInstrumentPrice, Arc<VendorInstrumentPrice>>,
}

impl FilteringTradePriceService {
    pub fn new() -> Self {
        Self::default()
    }

    fn filtered<P>(&self, predicate: P) -> HashSet<VendorInstrumentPrice>
    where
        P: Fn(&VendorInstrumentPrice) -> bool,
    {
        self.prices
            .iter()
            .filter(|entry| predicate(&**entry.value()))
            .map(|entry| (**entry.value()).clone())
            .collect()
    }
}

impl TradePriceService for FilteringTradePriceService {
    fn create_or_update(&self, price: VendorInstrumentPrice) {
        let price = Arc::new(price);
        self.prices.insert((*price).clone(), price);
    }

    fn get_by_vendor(&self, vendor_id: u64) -> Result<HashSet<VendorInstrumentPrice>> {
        Ok(self.filtered(|vip| vip.vendor.id == vendor_id))
    }

    fn get_by_instrument(&self, symbol: &str) -> Result<HashSet<VendorInstrumentPrice>> {
        Ok(self.filtered(|vip| vip.instrument.symbol == symbol))
    }

    fn get_all(&self) -> HashSet<VendorInstrumentPrice> {
        self.filtered(|_| true)
    }

    fn expire_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        let expired: Vec<Arc<VendorInstrumentPrice>> = self
            .prices
            .iter()
            .filter(|entry| entry.value().is_older_than(cutoff))
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        // Only remove the exact value that was found stale; a concurrent
        // update of the same vendor/instrument pair survives.
        let mut removed = 0;
        for price in expired {
            if self
                .prices
                .remove_if(&*price, |_, current| Arc::ptr_eq(current, &price))
                .is_some()
            {
                removed += 1;
            }
        }
        removed
    }

    fn len(&self) -> usize {
        self.prices.len()
    }
}

//! Indexed cache backed price service

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cache::{IndexedCache, KeyExtractor};
use crate::error::Result;
use crate::models::VendorInstrumentPrice;
use crate::service::TradePriceService;

/// Secondary key a price is indexed under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PriceKey {
    Vendor(u64),
    Instrument(String),
}

const VENDOR: usize = 0;
const INSTRUMENT: usize = 1;

// == Indexed Cache Trade Price Service ==
/// Prices held in an [`IndexedCache`] indexed by vendor id and instrument symbol.
pub struct IndexedCacheTradePriceService {
    cache: IndexedCache<VendorInstrumentPrice, PriceKey>,
}

impl IndexedCacheTradePriceService {
    // == Constructor ==
    pub fn new() -> Result<Self> {
        // Order must match the VENDOR and INSTRUMENT ordinals
        let extractors: Vec<KeyExtractor<VendorInstrumentPrice, PriceKey>> = vec![
            Box::new(|vip: &VendorInstrumentPrice| PriceKey::Vendor(vip.vendor.id)),
            Box::new(|vip: &VendorInstrumentPrice| {
                PriceKey::Instrument(vip.instrument.symbol.clone())
            }),
        ];

        Ok(Self {
            cache: IndexedCache::new(extractors)?,
        })
    }
}

impl TradePriceService for IndexedCacheTradePriceService {
    fn create_or_update(&self, price: VendorInstrumentPrice) {
        self.cache.add_item(price);
    }

    fn get_by_vendor(&self, vendor_id: u64) -> Result<HashSet<VendorInstrumentPrice>> {
        self.cache.get_by_index(VENDOR, &PriceKey::Vendor(vendor_id))
    }

    fn get_by_instrument(&self, symbol: &str) -> Result<HashSet<VendorInstrumentPrice>> {
        self.cache
            .get_by_index(INSTRUMENT, &PriceKey::Instrument(symbol.to_string()))
    }

    fn get_all(&self) -> HashSet<VendorInstrumentPrice> {
        self.cache.get_all()
    }

    fn expire_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        let removed = self.cache.evict(|vip| vip.is_older_than(cutoff));
        debug!("Evicted {} prices quoted before {}", removed.len(), cutoff);
        removed.len()
    }

    fn len(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_data::*;
    use chrono::Duration;

    fn populated() -> IndexedCacheTradePriceService {
        let service = IndexedCacheTradePriceService::new().unwrap();
        service.create_or_update(vip_1());
        service.create_or_update(vip_2());
        service.create_or_update(vip_3());
        service
    }

    #[test]
    fn test_get_by_vendor() {
        let service = populated();
        assert_eq!(
            service.get_by_vendor(1).unwrap(),
            HashSet::from([vip_1(), vip_2()])
        );
        assert_eq!(service.get_by_vendor(2).unwrap(), HashSet::from([vip_3()]));
        assert!(service.get_by_vendor(3).unwrap().is_empty());
    }

    #[test]
    fn test_get_by_instrument() {
        let service = populated();
        assert_eq!(
            service.get_by_instrument("BAY").unwrap(),
            HashSet::from([vip_2(), vip_3()])
        );
        assert!(service.get_by_instrument("XYZ").unwrap().is_empty());
    }

    #[test]
    fn test_get_all() {
        let service = populated();
        assert_eq!(service.get_all(), HashSet::from([vip_1(), vip_2(), vip_3()]));
        assert_eq!(service.len(), 3);
    }

    #[test]
    fn test_update_replaces_quote() {
        let service = populated();
        let mut updated = vip_1();
        updated.bid = 20.0;
        service.create_or_update(updated);

        let prices = service.get_by_instrument("VOD").unwrap();
        assert_eq!(prices.len(), 1);
        assert_eq!(prices.iter().next().unwrap().bid, 20.0);
        assert_eq!(service.len(), 3);
    }

    #[test]
    fn test_expire_older_than() {
        let service = populated();
        let mut fresh = vip_3();
        fresh.timestamp = timestamp_1() + Duration::days(10);
        service.create_or_update(fresh.clone());

        let removed = service.expire_older_than(timestamp_1() + Duration::days(1));
        assert_eq!(removed, 2);
        assert_eq!(service.get_all(), HashSet::from([fresh]));
        assert!(service.get_by_vendor(1).unwrap().is_empty());
    }
}

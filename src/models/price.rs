//! Price domain types
//!
//! A price is identified by its vendor and instrument; bid, ask and timestamp
//! are the values that change from one update to the next.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A price source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vendor {
    pub id: u64,
    pub name: String,
    pub description: String,
}

impl Vendor {
    pub fn new(id: u64, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
        }
    }
}

/// A traded instrument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub description: String,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            description: description.into(),
        }
    }
}

// == Vendor Instrument Price ==
/// The latest bid/ask quoted by one vendor for one instrument.
///
/// Equality and hashing only consider `vendor` and `instrument`, so a newer
/// quote for the same pair replaces the older one in the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorInstrumentPrice {
    pub vendor: Vendor,
    pub instrument: Instrument,
    pub bid: f64,
    pub ask: f64,
    pub timestamp: DateTime<Utc>,
}

impl VendorInstrumentPrice {
    /// Creates a price stamped with the current time.
    pub fn new(vendor: Vendor, instrument: Instrument, bid: f64, ask: f64) -> Self {
        Self::at(vendor, instrument, bid, ask, Utc::now())
    }

    /// Creates a price with an explicit timestamp.
    pub fn at(
        vendor: Vendor,
        instrument: Instrument,
        bid: f64,
        ask: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            vendor,
            instrument,
            bid,
            ask,
            timestamp,
        }
    }

    /// True if this price was quoted strictly before `cutoff`.
    pub fn is_older_than(&self, cutoff: DateTime<Utc>) -> bool {
        self.timestamp < cutoff
    }
}

impl PartialEq for VendorInstrumentPrice {
    fn eq(&self, other: &Self) -> bool {
        self.vendor == other.vendor && self.instrument == other.instrument
    }
}

impl Eq for VendorInstrumentPrice {}

impl Hash for VendorInstrumentPrice {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.vendor.hash(state);
        self.instrument.hash(state);
    }
}

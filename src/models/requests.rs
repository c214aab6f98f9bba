//! Request DTOs for the price service API
//!
//! Defines the structure of incoming price submissions, shared by the HTTP
//! endpoint and the CSV file flow.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{FieldError, PriceError, Result};
use crate::models::{Instrument, Vendor, VendorInstrumentPrice};

/// Request body for POST /price
///
/// Every field is optional at the wire level so that missing fields are
/// reported together by [`NewPriceRequest::validate`] instead of failing
/// deserialization on the first one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPriceRequest {
    pub vendor_id: Option<u64>,
    pub vendor_name: Option<String>,
    pub vendor_description: Option<String>,
    pub instrument_symbol: Option<String>,
    pub instrument_description: Option<String>,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    /// Quote time; the receive time is used when absent
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewPriceRequest {
    /// Validates the request data
    ///
    /// Returns every field error found, not just the first.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.vendor_id.is_none() {
            errors.push(not_null("vendorId"));
        }
        not_blank(&mut errors, "vendorName", &self.vendor_name);
        not_blank(&mut errors, "vendorDescription", &self.vendor_description);
        not_blank(&mut errors, "instrumentSymbol", &self.instrument_symbol);
        not_blank(&mut errors, "instrumentDescription", &self.instrument_description);
        finite_price(&mut errors, "bid", self.bid);
        finite_price(&mut errors, "ask", self.ask);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(PriceError::Validation(errors))
        }
    }

    /// Validates the request and converts it into a cacheable price.
    pub fn into_price(self) -> Result<VendorInstrumentPrice> {
        self.validate()?;

        // validate() guarantees every required field is present
        match self {
            NewPriceRequest {
                vendor_id: Some(vendor_id),
                vendor_name: Some(vendor_name),
                vendor_description: Some(vendor_description),
                instrument_symbol: Some(instrument_symbol),
                instrument_description: Some(instrument_description),
                bid: Some(bid),
                ask: Some(ask),
                timestamp,
            } => Ok(VendorInstrumentPrice::at(
                Vendor::new(vendor_id, vendor_name, vendor_description),
                Instrument::new(instrument_symbol, instrument_description),
                bid,
                ask,
                timestamp.unwrap_or_else(Utc::now),
            )),
            _ => Err(PriceError::Internal(
                "validated request is missing a field".to_string(),
            )),
        }
    }
}

fn not_null(field: &str) -> FieldError {
    FieldError::new(field, "must not be null", Value::Null)
}

fn finite_price(errors: &mut Vec<FieldError>, field: &str, value: Option<f64>) {
    match value {
        None => errors.push(not_null(field)),
        Some(v) if !v.is_finite() => {
            errors.push(FieldError::new(field, "must be a finite number", json!(v.to_string())))
        }
        Some(_) => {}
    }
}

fn not_blank(errors: &mut Vec<FieldError>, field: &str, value: &Option<String>) {
    match value {
        None => errors.push(FieldError::new(field, "must not be blank", Value::Null)),
        Some(v) if v.trim().is_empty() => {
            errors.push(FieldError::new(field, "must not be blank", json!(v)))
        }
        Some(_) => {}
    }
}

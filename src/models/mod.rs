//! Domain, request and response models for the price service
//!
//! This module defines the cached price types and the DTOs used for
//! serializing/deserializing HTTP request and response bodies.

pub mod price;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use price::{Instrument, Vendor, VendorInstrumentPrice};
pub use requests::NewPriceRequest;
pub use responses::{ErrorResponse, HealthResponse};

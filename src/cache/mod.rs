//! Cache Module
//!
//! Provides a concurrent, multi-index, latest-value-per-identity cache.

mod index;
mod revision;
mod store;


// Re-export public types
pub use index::KeyExtractor;
pub use revision::SequenceGenerator;
pub use store::IndexedCache;

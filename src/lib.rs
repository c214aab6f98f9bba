//! Trade Price - A price-distribution service
//!
//! Keeps the latest bid/ask per vendor and instrument in a lock-free,
//! multi-index cache, fed over HTTP and CSV file drops.

pub mod api;
pub mod cache;
pub mod config;
pub mod csv;
pub mod error;
pub mod models;
pub mod service;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{PriceError, Result};
pub use tasks::{spawn_eviction_task, spawn_file_ingest_task, spawn_queue_listener, PriceQueue};

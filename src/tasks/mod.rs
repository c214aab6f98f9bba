//! Background Tasks Module
//!
//! Contains background tasks that run periodically during service operation.
//!
//! # Tasks
//! - Eviction: removes prices older than the retention window
//! - File ingestion: polls a directory for CSV price files
//! - Queue listener: drains the in-process inbound price queue

mod eviction;
mod ingest;
mod queue;

pub use eviction::{evict_expired, spawn_eviction_task};
pub use ingest::{parse_price_file, spawn_file_ingest_task, FileIngestor};
pub use queue::{spawn_queue_listener, PriceQueue};

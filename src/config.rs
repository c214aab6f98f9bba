//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Which price store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// Indexed cache: O(1) lookup by vendor and by instrument
    Indexed,
    /// Single map, filtered by linear scan on every query
    Filtered,
}

impl FromStr for CacheMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "indexed" => Ok(CacheMode::Indexed),
            "filtered" => Ok(CacheMode::Filtered),
            other => Err(format!("unknown cache mode '{}'", other)),
        }
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Prices older than this many days are evicted
    pub price_evict_days: u32,
    /// Background eviction task interval in seconds
    pub evict_interval: u64,
    /// Directory polled for inbound CSV price files
    pub inbound_directory: PathBuf,
    /// Inbound directory poll interval in milliseconds
    pub inbound_poll_interval_ms: u64,
    /// Price store implementation
    pub cache_mode: CacheMode,
    /// Capacity of the outbound price broadcast channel
    pub publish_capacity: usize,
    /// Capacity of the in-process inbound price queue
    pub inbound_queue_capacity: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `PRICE_EVICT_DAYS` - Price retention in days (default: 30)
    /// - `EVICT_INTERVAL` - Eviction frequency in seconds (default: 3600)
    /// - `INBOUND_DIRECTORY` - CSV drop directory (default: ./filesIn)
    /// - `INBOUND_POLL_INTERVAL_MS` - CSV poll frequency (default: 1000)
    /// - `CACHE_MODE` - `indexed` or `filtered` (default: indexed)
    /// - `PUBLISH_CAPACITY` - Outbound channel capacity (default: 1024)
    /// - `INBOUND_QUEUE_CAPACITY` - Inbound queue capacity (default: 1024)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            price_evict_days: parse_var("PRICE_EVICT_DAYS").unwrap_or(defaults.price_evict_days),
            evict_interval: parse_var("EVICT_INTERVAL").unwrap_or(defaults.evict_interval),
            inbound_directory: env::var("INBOUND_DIRECTORY")
                .map(PathBuf::from)
                .unwrap_or(defaults.inbound_directory),
            inbound_poll_interval_ms: parse_var("INBOUND_POLL_INTERVAL_MS")
                .unwrap_or(defaults.inbound_poll_interval_ms),
            cache_mode: parse_var("CACHE_MODE").unwrap_or(defaults.cache_mode),
            publish_capacity: parse_var("PUBLISH_CAPACITY")
                .filter(|c| *c > 0)
                .unwrap_or(defaults.publish_capacity),
            inbound_queue_capacity: parse_var("INBOUND_QUEUE_CAPACITY")
                .filter(|c| *c > 0)
                .unwrap_or(defaults.inbound_queue_capacity),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            price_evict_days: 30,
            evict_interval: 3600,
            inbound_directory: PathBuf::from("./filesIn"),
            inbound_poll_interval_ms: 1000,
            cache_mode: CacheMode::Indexed,
            publish_capacity: 1024,
            inbound_queue_capacity: 1024,
        }
    }
}

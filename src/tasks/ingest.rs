//! CSV File Ingestion Task
//!
//! Polls an inbound directory for `*.csv` price files and feeds every valid
//! row into the price service. Each file is processed once.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::csv::NaiveCsvTokenizer;
use crate::error::{PriceError, Result};
use crate::models::{NewPriceRequest, VendorInstrumentPrice};
use crate::service::TradePriceService;

// == Row Mapping ==
fn text(row: &HashMap<String, String>, column: &str) -> Option<String> {
    row.get(column).cloned()
}

fn number<T: std::str::FromStr>(row: &HashMap<String, String>, column: &str) -> Result<Option<T>> {
    match row.get(column).map(|v| v.as_str()) {
        None | Some("") => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| PriceError::Csv(format!("invalid {} '{}'", column, v))),
    }
}

fn price(row: &HashMap<String, String>, column: &str) -> Result<Option<f64>> {
    match number::<f64>(row, column)? {
        Some(value) if !value.is_finite() => {
            Err(PriceError::Csv(format!("invalid {} '{}'", column, value)))
        }
        value => Ok(value),
    }
}

fn request_from_row(row: &HashMap<String, String>) -> Result<NewPriceRequest> {
    let timestamp = match row.get("timestamp").map(|v| v.as_str()) {
        None | Some("") => None,
        Some(v) => Some(
            DateTime::parse_from_rfc3339(v)
                .map_err(|e| PriceError::Csv(format!("invalid timestamp '{}': {}", v, e)))?
                .with_timezone(&Utc),
        ),
    };

    Ok(NewPriceRequest {
        vendor_id: number(row, "vendorId")?,
        vendor_name: text(row, "vendorName"),
        vendor_description: text(row, "vendorDescription"),
        instrument_symbol: text(row, "instrumentSymbol"),
        instrument_description: text(row, "instrumentDescription"),
        bid: price(row, "bid")?,
        ask: price(row, "ask")?,
        timestamp,
    })
}

// == Parse Price File ==
/// Parses the contents of one CSV price file.
///
/// The first non-blank line is the header; its column names match the
/// `NewPriceRequest` JSON fields. Rows without a timestamp are stamped with
/// `received`. Returns one result per data row, paired with its 1-based line
/// number, so a bad row never hides the good ones.
pub fn parse_price_file(
    contents: &str,
    received: DateTime<Utc>,
) -> Vec<(usize, Result<VendorInstrumentPrice>)> {
    let mut lines = contents
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let tokenizer = match lines.next() {
        Some((_, header)) => NaiveCsvTokenizer::new(header),
        None => return Vec::new(),
    };

    lines
        .map(|(line_no, line)| {
            let price = tokenizer
                .tokenize(line)
                .and_then(|row| request_from_row(&row))
                .and_then(|mut request| {
                    request.timestamp.get_or_insert(received);
                    request.into_price()
                });
            (line_no, price)
        })
        .collect()
}

// == File Ingestor ==
/// Accept-once poller over one inbound directory.
pub struct FileIngestor {
    service: Arc<dyn TradePriceService>,
    directory: PathBuf,
    seen: HashSet<PathBuf>,
}

impl FileIngestor {
    pub fn new(service: Arc<dyn TradePriceService>, directory: impl Into<PathBuf>) -> Self {
        Self {
            service,
            directory: directory.into(),
            seen: HashSet::new(),
        }
    }

    // == Poll ==
    /// Processes every `*.csv` file not seen before.
    ///
    /// Returns the number of prices handed to the service.
    pub async fn poll(&mut self) -> usize {
        let files = match self.new_files().await {
            Ok(files) => files,
            Err(e) => {
                warn!(
                    "Cannot read inbound directory {}: {}",
                    self.directory.display(),
                    e
                );
                return 0;
            }
        };

        let mut ingested = 0;
        for path in files {
            self.seen.insert(path.clone());
            match tokio::fs::read_to_string(&path).await {
                Ok(contents) => ingested += self.ingest(&path, &contents),
                Err(e) => error!("Failed to read {}: {}", path.display(), e),
            }
        }
        ingested
    }

    async fn new_files(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.directory).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_csv = path.extension().is_some_and(|ext| ext == "csv");
            if is_csv && !self.seen.contains(&path) && entry.file_type().await?.is_file() {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    fn ingest(&self, path: &Path, contents: &str) -> usize {
        let mut ingested = 0;
        for (line_no, price) in parse_price_file(contents, Utc::now()) {
            match price {
                Ok(price) => {
                    self.service.create_or_update(price);
                    ingested += 1;
                }
                Err(e) => error!("Rejected {} line {}: {}", path.display(), line_no, e),
            }
        }
        info!("Ingested {} prices from {}", ingested, path.display());
        ingested
    }
}

/// Spawns a background task that polls `directory` for CSV price files.
///
/// The directory is created if missing.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_file_ingest_task(
    service: Arc<dyn TradePriceService>,
    directory: PathBuf,
    poll_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = tokio::fs::create_dir_all(&directory).await {
            warn!("Cannot create inbound directory {}: {}", directory.display(), e);
        }
        info!(
            "Starting file ingestion task on {} every {:?}",
            directory.display(),
            poll_interval
        );

        let mut ingestor = FileIngestor::new(service, directory);
        loop {
            let ingested = ingestor.poll().await;
            if ingested == 0 {
                debug!("File ingestion: nothing new");
            }
            tokio::time::sleep(poll_interval).await;
        }
    })
}

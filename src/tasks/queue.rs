//! Inbound Price Queue
//!
//! In-process message queue for new prices. Producers submit
//! `NewPriceRequest` messages through a [`PriceQueue`]; a listener task
//! validates each one and hands it to the price service.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::{PriceError, Result};
use crate::models::NewPriceRequest;
use crate::service::TradePriceService;

/// Producer handle for the inbound price queue.
#[derive(Debug, Clone)]
pub struct PriceQueue {
    sender: mpsc::Sender<NewPriceRequest>,
}

impl PriceQueue {
    /// Creates a bounded queue, returning the producer handle and the inbox
    /// to give to [`spawn_queue_listener`].
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<NewPriceRequest>) {
        let (sender, inbox) = mpsc::channel(capacity.max(1));
        (Self { sender }, inbox)
    }

    /// Enqueues a price, waiting while the queue is full.
    ///
    /// # Errors
    /// `Internal` if the listener has stopped.
    pub async fn submit(&self, request: NewPriceRequest) -> Result<()> {
        self.sender
            .send(request)
            .await
            .map_err(|_| PriceError::Internal("inbound price queue is closed".to_string()))
    }
}

/// Spawns the listener draining `inbox` into `service`.
///
/// Invalid messages are logged and dropped. The task ends once every
/// [`PriceQueue`] handle has been dropped and the inbox is empty.
pub fn spawn_queue_listener(
    service: Arc<dyn TradePriceService>,
    mut inbox: mpsc::Receiver<NewPriceRequest>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting inbound price queue listener");

        while let Some(request) = inbox.recv().await {
            match request.into_price() {
                Ok(price) => {
                    debug!("Queued price {}/{}", price.vendor.id, price.instrument.symbol);
                    service.create_or_update(price);
                }
                Err(e) => error!("Rejected queued price: {}", e),
            }
        }

        info!("Inbound price queue closed");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::IndexedCacheTradePriceService;

    fn request(vendor_id: u64, symbol: &str) -> NewPriceRequest {
        NewPriceRequest {
            vendor_id: Some(vendor_id),
            vendor_name: Some(format!("Vendor {}", vendor_id)),
            vendor_description: Some("desc".to_string()),
            instrument_symbol: Some(symbol.to_string()),
            instrument_description: Some(format!("{} plc", symbol)),
            bid: Some(1.0),
            ask: Some(1.5),
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn test_listener_stores_valid_and_drops_invalid() {
        let service: Arc<dyn TradePriceService> =
            Arc::new(IndexedCacheTradePriceService::new().unwrap());
        let (queue, inbox) = PriceQueue::channel(4);
        let handle = spawn_queue_listener(service.clone(), inbox);

        queue.submit(request(1, "VOD")).await.unwrap();
        let mut invalid = request(2, "VOD");
        invalid.ask = None;
        queue.submit(invalid).await.unwrap();
        queue.submit(request(3, "BAY")).await.unwrap();

        // Closing the queue lets the listener drain and finish
        drop(queue);
        handle.await.unwrap();

        assert_eq!(service.len(), 2);
        assert!(service.get_by_vendor(2).unwrap().is_empty());
        assert_eq!(service.get_by_instrument("BAY").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_after_listener_stopped_fails() {
        let (queue, inbox) = PriceQueue::channel(1);
        drop(inbox);

        let result = queue.submit(request(1, "VOD")).await;
        assert!(matches!(result, Err(PriceError::Internal(_))));
    }
}

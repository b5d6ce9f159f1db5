//! Usage-accounting emission path
//!
//! Publishes one usage event per dimension series to the internal event bus.
//! Delivery is best-effort: failures are logged and swallowed so usage
//! accounting can never abort metric submission.

use async_trait::async_trait;
use sensorwatch_common::{CollaboratorError, UsageEvent};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

use crate::collaborators::EventBus;

/// Forwards usage events to the event bus
pub struct UsageSink {
    bus: Arc<dyn EventBus>,
}

impl UsageSink {
    pub fn new(bus: Arc<dyn EventBus>) -> Self {
        Self { bus }
    }

    /// Publish a usage event, returning whether it was delivered
    #[instrument(skip(self, event), fields(
        resource = %event.resource_uuid,
        metric = %event.metric_name,
        sequence = event.sequence_index,
    ))]
    pub async fn emit(&self, event: UsageEvent) -> bool {
        if let Err(e) = event.validate() {
            warn!(error = %e, "Dropping invalid usage event");
            return false;
        }

        let event_id = event.event_id;
        match self.bus.publish(event).await {
            Ok(()) => {
                debug!(%event_id, "Published usage event");
                true
            }
            Err(e) => {
                warn!(%event_id, error = %e, "Failed to fire usage event");
                false
            }
        }
    }
}

/// Event bus metrics
#[derive(Debug, Default)]
pub struct EventBusMetrics {
    pub events_published: AtomicU64,
    pub events_dropped: AtomicU64,
}

/// In-process event bus backed by a bounded channel
pub struct ChannelEventBus {
    event_tx: mpsc::Sender<UsageEvent>,
    metrics: EventBusMetrics,
}

impl ChannelEventBus {
    /// Create a bus and the receiver consuming its events
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<UsageEvent>) {
        let (event_tx, event_rx) = mpsc::channel(buffer.max(1));
        let bus = Self {
            event_tx,
            metrics: EventBusMetrics::default(),
        };
        (bus, event_rx)
    }

    /// Get bus metrics
    pub fn metrics(&self) -> &EventBusMetrics {
        &self.metrics
    }
}

#[async_trait]
impl EventBus for ChannelEventBus {
    async fn publish(&self, event: UsageEvent) -> Result<(), CollaboratorError> {
        match self.event_tx.send(event).await {
            Ok(()) => {
                self.metrics.events_published.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(_) => {
                self.metrics.events_dropped.fetch_add(1, Ordering::Relaxed);
                Err(CollaboratorError::EventBus("usage event channel closed".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event(resource: &str) -> UsageEvent {
        UsageEvent::new(
            resource.to_string(),
            "web-1".to_string(),
            "NetworkIn".to_string(),
            3,
            "total".to_string(),
            128.0,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_emit_delivers_to_channel() {
        let (bus, mut rx) = ChannelEventBus::new(8);
        let bus = Arc::new(bus);
        let sink = UsageSink::new(bus.clone());

        assert!(sink.emit(event("i-1234")).await);
        let received = rx.recv().await.unwrap();
        assert_eq!(received.resource_uuid, "i-1234");
        assert_eq!(received.sequence_index, 3);
        assert_eq!(bus.metrics().events_published.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_emit_swallows_closed_channel() {
        let (bus, rx) = ChannelEventBus::new(8);
        drop(rx);
        let bus = Arc::new(bus);
        let sink = UsageSink::new(bus.clone());

        assert!(!sink.emit(event("i-1234")).await);
        assert_eq!(bus.metrics().events_dropped.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_emit_rejects_invalid_event() {
        let (bus, mut rx) = ChannelEventBus::new(8);
        let sink = UsageSink::new(Arc::new(bus));

        assert!(!sink.emit(event("")).await);
        assert!(rx.try_recv().is_err());
    }
}

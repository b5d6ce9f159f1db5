//! Collection cycle driver
//!
//! Once per interval: list running instances, request their sensor data,
//! and process the returned batch.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, instrument};

use crate::collaborators::{InstanceRegistry, SensorSource};
use crate::config::RelayConfig;
use crate::pipeline::{BatchProcessor, BatchReport};

/// Sensor data request for one collection cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorRequest {
    /// Historical values wanted per dimension
    pub history_size: u32,
    pub collection_interval_ms: u64,
    /// Instances to report on, sorted
    pub instance_ids: Vec<String>,
}

/// Periodic sensor poller
pub struct SensorPoller {
    source: Arc<dyn SensorSource>,
    registry: Arc<dyn InstanceRegistry>,
    processor: Arc<BatchProcessor>,
    history_size: u32,
    collection_interval_ms: u64,
    shutdown: Arc<RwLock<bool>>,
}

impl SensorPoller {
    pub fn new(
        config: &RelayConfig,
        source: Arc<dyn SensorSource>,
        registry: Arc<dyn InstanceRegistry>,
        processor: Arc<BatchProcessor>,
    ) -> Self {
        Self {
            source,
            registry,
            processor,
            history_size: config.history_size,
            collection_interval_ms: config.collection_interval_ms,
            shutdown: Arc::new(RwLock::new(false)),
        }
    }

    /// Run one collection cycle
    #[instrument(skip(self))]
    pub async fn poll_once(&self) -> BatchReport {
        let running = match self.registry.list_running_resource_ids().await {
            Ok(running) => running,
            Err(e) => {
                error!(error = %e, "Unable to list running instances, skipping cycle");
                let report = BatchReport::listing_failed();
                self.processor.observe(&report);
                return report;
            }
        };

        let mut instance_ids: Vec<String> = running.iter().cloned().collect();
        instance_ids.sort();
        let request = SensorRequest {
            history_size: self.history_size,
            collection_interval_ms: self.collection_interval_ms,
            instance_ids,
        };

        match self.source.describe_sensors(&request).await {
            Ok(batch) => self.processor.process_batch_with(&batch, &running).await,
            Err(e) => {
                error!(error = %e, "Sensor request failed");
                let report = BatchReport::fetch_failed();
                self.processor.observe(&report);
                report
            }
        }
    }

    /// Stop the background loop after its current cycle
    pub fn shutdown(&self) {
        *self.shutdown.write() = true;
    }

    /// Start the background collection loop
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_millis(
                self.collection_interval_ms,
            ));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                if *self.shutdown.read() {
                    info!("Sensor poller stopped");
                    break;
                }
                let report = self.poll_once().await;
                if report.resources_failed > 0 {
                    info!(failed = report.resources_failed, "Cycle finished with failed resources");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::ChannelEventBus;
    use crate::memory::{
        InMemoryInstanceRegistry, RecordingMonitoringApi, StaticAccountDirectory, StaticSensorSource,
    };
    use crate::metrics::RelayMetrics;
    use chrono::{TimeZone, Utc};
    use sensorwatch_common::{
        DimensionSeries, InstanceDescriptor, MetricSeries, ResourceSample, SensorBatch, TimedValue,
        UsageEvent,
    };
    use tokio::sync::mpsc;

    fn batch() -> SensorBatch {
        let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        SensorBatch::new(vec![ResourceSample::instance("i-1", "i-1").with_metric(
            MetricSeries::single(
                "NetworkIn",
                DimensionSeries::new("total", 0, vec![TimedValue::new(at, 10.0)]),
            ),
        )])
    }

    struct Fixture {
        poller: SensorPoller,
        registry: Arc<InMemoryInstanceRegistry>,
        api: Arc<RecordingMonitoringApi>,
        metrics: Arc<RelayMetrics>,
        usage_rx: mpsc::Receiver<UsageEvent>,
    }

    fn fixture(source: Arc<StaticSensorSource>) -> Fixture {
        let config = RelayConfig {
            collection_interval_ms: 10,
            ..Default::default()
        };
        let registry = Arc::new(
            InMemoryInstanceRegistry::new()
                .with_instance(InstanceDescriptor::new("i-2", "emi-1", "m1.small", "000001"))
                .with_instance(InstanceDescriptor::new("i-1", "emi-1", "m1.small", "000001")),
        );
        let accounts = Arc::new(StaticAccountDirectory::new().with_principal("000001", "AIDADMIN1"));
        let api = Arc::new(RecordingMonitoringApi::new());
        let metrics = Arc::new(RelayMetrics::new().unwrap());
        let (bus, usage_rx) = ChannelEventBus::new(1024);
        let processor = Arc::new(
            BatchProcessor::new(&config, registry.clone(), accounts, api.clone(), Arc::new(bus))
                .with_metrics(metrics.clone()),
        );
        Fixture {
            poller: SensorPoller::new(&config, source, registry.clone(), processor),
            registry,
            api,
            metrics,
            usage_rx,
        }
    }

    #[tokio::test]
    async fn test_poll_once_builds_request_and_processes() {
        let source = Arc::new(StaticSensorSource::new(batch()));
        let mut f = fixture(source.clone());

        let report = f.poller.poll_once().await;
        assert_eq!(report.submissions, 1);
        assert_eq!(report.usage_events, 1);
        assert_eq!(report.usage_event_errors, 0);
        assert_eq!(f.api.metric_names(), vec!["NetworkInAbsolute".to_string()]);
        assert!(f.usage_rx.try_recv().is_ok());

        let requests = source.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].instance_ids, vec!["i-1".to_string(), "i-2".to_string()]);
        assert_eq!(requests[0].history_size, 5);
        assert_eq!(requests[0].collection_interval_ms, 10);
    }

    #[tokio::test]
    async fn test_failed_fetch_yields_empty_report() {
        let f = fixture(Arc::new(StaticSensorSource::failing()));
        let report = f.poller.poll_once().await;
        assert!(report.fetch_failed);
        assert_eq!(report.resources_processed, 0);
        assert!(f.api.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_failed_cycles_are_counted() {
        let f = fixture(Arc::new(StaticSensorSource::failing()));

        f.poller.poll_once().await;
        assert_eq!(f.metrics.batches_total.get(), 1);
        assert_eq!(f.metrics.batches_failed.get(), 1);

        f.registry.set_unavailable(true);
        let report = f.poller.poll_once().await;
        assert!(report.listing_failed);
        assert_eq!(f.metrics.batches_total.get(), 2);
        assert_eq!(f.metrics.batches_failed.get(), 2);
    }

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let source = Arc::new(StaticSensorSource::new(batch()));
        let f = fixture(source.clone());
        let api = f.api.clone();
        let poller = Arc::new(f.poller);

        let handle = poller.clone().start();
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        poller.shutdown();
        handle.await.unwrap();

        assert!(!source.requests().is_empty());
        assert!(!api.submissions().is_empty());
        assert_eq!(f.metrics.usage_event_errors.get(), 0);
    }
}

//! Sensor batch processor
//!
//! Walks resource → metric → counter → dimension → values for every running
//! instance in a batch. Each dimension series is ordered once; every value is
//! submitted oldest first together with any combined metric it completes, then
//! the newest value is published as one usage event.
//!
//! Failures are isolated per emission and per resource. Nothing here
//! returns an error to the caller.

use futures::future::join_all;
use sensorwatch_common::{
    CollaboratorError, DimensionSeries, MetricObservation, MetricSeries, ResourceSample, Result,
    SensorBatch, SensorwatchError, UsageEvent,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use super::report::BatchReport;
use crate::collaborators::{AccountDirectory, EventBus, InstanceRegistry, MonitoringApi};
use crate::config::{RelayConfig, UsageGating};
use crate::correlation::CorrelationCache;
use crate::dispatch::{MonitoringSink, SubmitOutcome, UsageSink};
use crate::metrics::RelayMetrics;

/// Processes one sensor batch per call
pub struct BatchProcessor {
    registry: Arc<dyn InstanceRegistry>,
    monitoring: MonitoringSink,
    usage: UsageSink,
    usage_gating: UsageGating,
    max_concurrent_resources: usize,
    metrics: Option<Arc<RelayMetrics>>,
}

impl BatchProcessor {
    pub fn new(
        config: &RelayConfig,
        registry: Arc<dyn InstanceRegistry>,
        accounts: Arc<dyn AccountDirectory>,
        monitoring_api: Arc<dyn MonitoringApi>,
        event_bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            monitoring: MonitoringSink::new(registry.clone(), accounts, monitoring_api),
            usage: UsageSink::new(event_bus),
            registry,
            usage_gating: config.usage_gating,
            max_concurrent_resources: config.max_concurrent_resources.max(1),
            metrics: None,
        }
    }

    /// Record batch outcomes on Prometheus counters
    pub fn with_metrics(mut self, metrics: Arc<RelayMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Process a batch against the registry's current running instance set
    #[instrument(skip(self, batch), fields(resources = batch.len()))]
    pub async fn process_batch(&self, batch: &SensorBatch) -> BatchReport {
        match self.registry.list_running_resource_ids().await {
            Ok(running) => self.process_batch_with(batch, &running).await,
            Err(e) => {
                error!(error = %e, "Unable to list running instances, batch dropped");
                let report = BatchReport::listing_failed();
                self.observe(&report);
                report
            }
        }
    }

    /// Process a batch against a known running instance set
    pub async fn process_batch_with(
        &self,
        batch: &SensorBatch,
        running: &HashSet<String>,
    ) -> BatchReport {
        // Correlation is only meaningful within one snapshot
        let cache = CorrelationCache::new();
        let mut report = BatchReport::new();

        let mut selected = Vec::with_capacity(batch.len());
        for resource in &batch.resources {
            if resource.is_instance() && running.contains(&resource.resource_uuid) {
                selected.push(resource);
            } else {
                debug!(
                    resource = %resource.resource_uuid,
                    resource_type = %resource.resource_type,
                    "Skipping sample that is not a running instance"
                );
                report.resources_skipped += 1;
            }
        }

        for chunk in selected.chunks(self.max_concurrent_resources) {
            let resource_reports =
                join_all(chunk.iter().map(|resource| self.process_resource(resource, &cache))).await;
            for resource_report in &resource_reports {
                report.merge(resource_report);
            }
        }

        info!(
            batch_id = %report.batch_id,
            processed = report.resources_processed,
            skipped = report.resources_skipped,
            failed = report.resources_failed,
            submissions = report.submissions,
            suppressed = report.submissions_suppressed,
            dropped = report.submission_error_count(),
            combined = report.combined_metrics,
            usage_events = report.usage_events,
            "Processed sensor batch"
        );
        self.observe(&report);
        report
    }

    /// Process one resource, containing any failure to that resource
    async fn process_resource(&self, resource: &ResourceSample, cache: &CorrelationCache) -> BatchReport {
        let mut report = BatchReport::default();
        match self.walk_resource(resource, cache, &mut report).await {
            Ok(()) => report.resources_processed += 1,
            Err(e) => {
                error!(
                    resource = %resource.resource_uuid,
                    error = %e,
                    "Abandoning remaining sensor data for resource"
                );
                report.resources_failed += 1;
            }
        }
        report
    }

    async fn walk_resource(
        &self,
        resource: &ResourceSample,
        cache: &CorrelationCache,
        report: &mut BatchReport,
    ) -> Result<()> {
        let usage_allowed = self.usage_allowed(&resource.resource_uuid).await?;

        for metric in &resource.metrics {
            for counter in &metric.counters {
                for dimension in &counter.dimensions {
                    self.process_dimension(resource, metric, dimension, cache, usage_allowed, report)
                        .await?;
                }
            }
        }
        Ok(())
    }

    async fn process_dimension(
        &self,
        resource: &ResourceSample,
        metric: &MetricSeries,
        dimension: &DimensionSeries,
        cache: &CorrelationCache,
        usage_allowed: bool,
        report: &mut BatchReport,
    ) -> Result<()> {
        let values = dimension.ordered_values();
        let Some(latest) = values.last().copied() else {
            return Ok(());
        };

        for value in &values {
            debug!(
                resource = %resource.resource_uuid,
                metric = %metric.metric_name,
                dimension = %dimension.dimension_name,
                timestamp = %value.timestamp,
                value = value.value,
                "Sensor value"
            );
            let observation = MetricObservation {
                resource_uuid: resource.resource_uuid.clone(),
                resource_name: resource.resource_name.clone(),
                metric_name: metric.metric_name.clone(),
                dimension_name: dimension.dimension_name.clone(),
                sequence_number: dimension.sequence_number,
                value: value.value,
                timestamp: value.timestamp,
            };
            self.dispatch(&observation, report).await?;

            for combined in cache.combine_all(&observation) {
                report.combined_metrics += 1;
                self.dispatch(&MetricObservation::from(combined), report).await?;
            }
        }

        if usage_allowed {
            let event = UsageEvent::new(
                resource.resource_uuid.clone(),
                resource.resource_name.clone(),
                metric.metric_name.clone(),
                dimension.latest_sequence_index(values.len()),
                dimension.dimension_name.clone(),
                latest.value,
                latest.timestamp,
            );
            if self.usage.emit(event).await {
                report.usage_events += 1;
            } else {
                report.usage_event_errors += 1;
            }
        }
        Ok(())
    }

    /// Submit one observation. Dropped points are counted; only an
    /// unreachable instance registry aborts the resource.
    async fn dispatch(&self, observation: &MetricObservation, report: &mut BatchReport) -> Result<()> {
        match self.monitoring.submit(observation).await {
            Ok(SubmitOutcome::Submitted) => report.submissions += 1,
            Ok(SubmitOutcome::Suppressed) => report.submissions_suppressed += 1,
            Err(SensorwatchError::Dispatch(e)) => {
                debug!(
                    resource = %observation.resource_uuid,
                    metric = %observation.metric_name,
                    reason = e.reason(),
                    "Dropped metric point: {}",
                    e
                );
                report.record_submission_error(e.reason());
            }
            Err(SensorwatchError::Collaborator(e @ CollaboratorError::Registry(_))) => {
                return Err(e.into());
            }
            Err(e) => {
                warn!(
                    resource = %observation.resource_uuid,
                    metric = %observation.metric_name,
                    error = %e,
                    "Metric point not delivered"
                );
                report.record_submission_error("transport");
            }
        }
        Ok(())
    }

    async fn usage_allowed(&self, resource_id: &str) -> Result<bool> {
        match self.usage_gating {
            UsageGating::Independent => Ok(true),
            UsageGating::FollowMonitoring => {
                let instance = self.registry.lookup_instance(resource_id).await?;
                Ok(instance.is_some_and(|i| i.instance_id == resource_id && i.monitoring_enabled))
            }
        }
    }

    /// Record a batch outcome on the attached counters, if any
    pub fn observe(&self, report: &BatchReport) {
        if let Some(metrics) = &self.metrics {
            metrics.observe(report);
        }
    }
}

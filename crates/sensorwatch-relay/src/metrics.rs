//! Prometheus metrics for the relay

use crate::pipeline::BatchReport;

/// Per-batch outcome counters
pub struct RelayMetrics {
    pub batches_total: prometheus::IntCounter,
    pub batches_failed: prometheus::IntCounter,
    pub resources_processed: prometheus::IntCounter,
    pub resources_failed: prometheus::IntCounter,
    pub submissions_total: prometheus::IntCounter,
    pub submissions_suppressed: prometheus::IntCounter,
    pub submission_errors: prometheus::IntCounterVec,
    pub combined_metrics: prometheus::IntCounter,
    pub usage_events_total: prometheus::IntCounter,
    pub usage_event_errors: prometheus::IntCounter,
}

impl RelayMetrics {
    pub fn new() -> prometheus::Result<Self> {
        Ok(Self {
            batches_total: prometheus::IntCounter::new(
                "sensorwatch_batches_total",
                "Sensor batches processed",
            )?,
            batches_failed: prometheus::IntCounter::new(
                "sensorwatch_batches_failed_total",
                "Sensor batches dropped before processing",
            )?,
            resources_processed: prometheus::IntCounter::new(
                "sensorwatch_resources_processed_total",
                "Instance samples fully processed",
            )?,
            resources_failed: prometheus::IntCounter::new(
                "sensorwatch_resources_failed_total",
                "Instance samples abandoned part-way through",
            )?,
            submissions_total: prometheus::IntCounter::new(
                "sensorwatch_submissions_total",
                "Metric points accepted by the monitoring API",
            )?,
            submissions_suppressed: prometheus::IntCounter::new(
                "sensorwatch_submissions_suppressed_total",
                "Metric points dropped as unsupported in their namespace",
            )?,
            submission_errors: prometheus::IntCounterVec::new(
                prometheus::Opts::new(
                    "sensorwatch_submission_errors_total",
                    "Metric points dropped by reason",
                ),
                &["reason"],
            )?,
            combined_metrics: prometheus::IntCounter::new(
                "sensorwatch_combined_metrics_total",
                "Derived metrics produced from correlated counters",
            )?,
            usage_events_total: prometheus::IntCounter::new(
                "sensorwatch_usage_events_total",
                "Usage events delivered to the event bus",
            )?,
            usage_event_errors: prometheus::IntCounter::new(
                "sensorwatch_usage_event_errors_total",
                "Usage events that could not be delivered",
            )?,
        })
    }

    pub fn register(&self, registry: &prometheus::Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.batches_total.clone()))?;
        registry.register(Box::new(self.batches_failed.clone()))?;
        registry.register(Box::new(self.resources_processed.clone()))?;
        registry.register(Box::new(self.resources_failed.clone()))?;
        registry.register(Box::new(self.submissions_total.clone()))?;
        registry.register(Box::new(self.submissions_suppressed.clone()))?;
        registry.register(Box::new(self.submission_errors.clone()))?;
        registry.register(Box::new(self.combined_metrics.clone()))?;
        registry.register(Box::new(self.usage_events_total.clone()))?;
        registry.register(Box::new(self.usage_event_errors.clone()))?;
        Ok(())
    }

    /// Add a finished batch's counts
    pub fn observe(&self, report: &BatchReport) {
        self.batches_total.inc();
        if report.is_dropped() {
            self.batches_failed.inc();
        }
        self.resources_processed.inc_by(report.resources_processed);
        self.resources_failed.inc_by(report.resources_failed);
        self.submissions_total.inc_by(report.submissions);
        self.submissions_suppressed.inc_by(report.submissions_suppressed);
        for (reason, count) in &report.submission_errors {
            self.submission_errors
                .with_label_values(&[reason.as_str()])
                .inc_by(*count);
        }
        self.combined_metrics.inc_by(report.combined_metrics);
        self.usage_events_total.inc_by(report.usage_events);
        self.usage_event_errors.inc_by(report.usage_event_errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_observe() {
        let registry = prometheus::Registry::new();
        let metrics = RelayMetrics::new().unwrap();
        metrics.register(&registry).unwrap();

        let mut report = BatchReport::new();
        report.submissions = 4;
        report.record_submission_error("unknown_unit");
        metrics.observe(&report);

        assert_eq!(metrics.batches_total.get(), 1);
        assert_eq!(metrics.submissions_total.get(), 4);
        assert_eq!(
            metrics
                .submission_errors
                .with_label_values(&["unknown_unit"])
                .get(),
            1
        );
        assert!(!registry.gather().is_empty());
    }
}

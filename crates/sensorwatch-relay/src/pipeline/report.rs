//! Per-batch outcome counts

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// What happened to one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    /// Running instance set could not be listed; nothing was processed
    pub listing_failed: bool,
    /// Sensor data could not be fetched; nothing was processed
    pub fetch_failed: bool,
    /// Samples that were not running instances
    pub resources_skipped: u64,
    pub resources_processed: u64,
    /// Resources abandoned part-way through
    pub resources_failed: u64,
    /// Points accepted by the monitoring API
    pub submissions: u64,
    pub submissions_suppressed: u64,
    /// Dropped points by reason
    pub submission_errors: BTreeMap<String, u64>,
    pub combined_metrics: u64,
    pub usage_events: u64,
    pub usage_event_errors: u64,
}

impl BatchReport {
    pub fn new() -> Self {
        Self {
            batch_id: Uuid::now_v7(),
            ..Default::default()
        }
    }

    /// Report for a batch that could not be processed at all
    pub fn listing_failed() -> Self {
        Self {
            listing_failed: true,
            ..Self::new()
        }
    }

    /// Report for a cycle whose sensor request failed
    pub fn fetch_failed() -> Self {
        Self {
            fetch_failed: true,
            ..Self::new()
        }
    }

    /// Whether the batch was dropped before any resource was processed
    pub fn is_dropped(&self) -> bool {
        self.listing_failed || self.fetch_failed
    }

    pub fn record_submission_error(&mut self, reason: &str) {
        *self.submission_errors.entry(reason.to_string()).or_insert(0) += 1;
    }

    /// Total dropped points
    pub fn submission_error_count(&self) -> u64 {
        self.submission_errors.values().sum()
    }

    /// Fold the counts of another report into this one
    pub fn merge(&mut self, other: &BatchReport) {
        self.listing_failed |= other.listing_failed;
        self.fetch_failed |= other.fetch_failed;
        self.resources_skipped += other.resources_skipped;
        self.resources_processed += other.resources_processed;
        self.resources_failed += other.resources_failed;
        self.submissions += other.submissions;
        self.submissions_suppressed += other.submissions_suppressed;
        for (reason, count) in &other.submission_errors {
            *self.submission_errors.entry(reason.clone()).or_insert(0) += count;
        }
        self.combined_metrics += other.combined_metrics;
        self.usage_events += other.usage_events;
        self.usage_event_errors += other.usage_event_errors;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge() {
        let mut a = BatchReport::new();
        a.submissions = 3;
        a.record_submission_error("unknown_unit");

        let mut b = BatchReport::default();
        b.submissions = 2;
        b.resources_failed = 1;
        b.record_submission_error("unknown_unit");
        b.record_submission_error("rejected");

        a.merge(&b);
        assert_eq!(a.submissions, 5);
        assert_eq!(a.resources_failed, 1);
        assert_eq!(a.submission_errors["unknown_unit"], 2);
        assert_eq!(a.submission_error_count(), 3);
    }
}

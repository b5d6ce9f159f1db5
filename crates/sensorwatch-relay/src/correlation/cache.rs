//! Per-batch correlation cache
//!
//! Pairs two independently reported counters that share a resource,
//! dimension, and timestamp into one derived metric. A cache lives for a
//! single batch; correlation across collection cycles is meaningless.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sensorwatch_common::{CombinedMetric, MetricObservation, TimedValue};
use tracing::debug;

/// Identity two correlated values share
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct CorrelationKey {
    pub resource_uuid: String,
    pub resource_name: String,
    pub dimension_name: String,
    pub timestamp: DateTime<Utc>,
}

impl CorrelationKey {
    /// Create a key from an observation
    pub fn from_observation(observation: &MetricObservation) -> Self {
        Self {
            resource_uuid: observation.resource_uuid.clone(),
            resource_name: observation.resource_name.clone(),
            dimension_name: observation.dimension_name.clone(),
            timestamp: observation.timestamp,
        }
    }
}

/// Cache entry key components
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct EntryKey {
    metric_name: String,
    key: CorrelationKey,
}

/// Two raw counters that sum into a derived metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationPair {
    pub first: &'static str,
    pub second: &'static str,
    /// Name of the derived metric
    pub combined: &'static str,
}

impl CorrelationPair {
    pub const fn new(first: &'static str, second: &'static str, combined: &'static str) -> Self {
        Self {
            first,
            second,
            combined,
        }
    }

    /// The other side of the pair, if `metric_name` belongs to it
    pub fn partner(&self, metric_name: &str) -> Option<&'static str> {
        if metric_name == self.first {
            Some(self.second)
        } else if metric_name == self.second {
            Some(self.first)
        } else {
            None
        }
    }
}

/// Consumed read+write ops is throughput% / 100 * (read + write ops).
/// Throughput is fixed at 100%, so the derived value is a plain sum.
pub const CORRELATION_PAIRS: [CorrelationPair; 3] = [
    CorrelationPair::new("DiskReadOps", "DiskWriteOps", "DiskConsumedReadWriteOps"),
    CorrelationPair::new("VolumeReadOps", "VolumeWriteOps", "VolumeConsumedReadWriteOps"),
    CorrelationPair::new("VolumeTotalReadTime", "VolumeTotalWriteTime", "VolumeTotalReadWriteTime"),
];

/// Keyed store of the most recent value seen per metric name and identity
#[derive(Debug, Default)]
pub struct CorrelationCache {
    entries: DashMap<EntryKey, TimedValue>,
}

impl CorrelationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing any earlier value under the same name and identity
    pub fn record(&self, metric_name: &str, key: CorrelationKey, value: TimedValue) {
        self.entries.insert(
            EntryKey {
                metric_name: metric_name.to_string(),
                key,
            },
            value,
        );
    }

    /// Get the cached value for a name and identity
    pub fn get(&self, metric_name: &str, key: &CorrelationKey) -> Option<TimedValue> {
        let lookup = EntryKey {
            metric_name: metric_name.to_string(),
            key: key.clone(),
        };
        self.entries.get(&lookup).map(|entry| *entry)
    }

    /// Record `observation` under its own name and, if the other side of
    /// `pair` was already seen for the same identity, derive the combined metric.
    ///
    /// The partner entry is left in place and can complete later pairs too.
    pub fn combine(
        &self,
        pair: &CorrelationPair,
        observation: &MetricObservation,
    ) -> Option<CombinedMetric> {
        let partner = pair.partner(&observation.metric_name)?;
        let key = CorrelationKey::from_observation(observation);

        self.record(
            &observation.metric_name,
            key.clone(),
            TimedValue::new(observation.timestamp, observation.value),
        );

        let other = self.get(partner, &key)?;
        debug!(
            resource = %observation.resource_uuid,
            dimension = %observation.dimension_name,
            combined = pair.combined,
            "Correlated {} with {}",
            observation.metric_name,
            partner
        );

        Some(CombinedMetric {
            resource_uuid: observation.resource_uuid.clone(),
            resource_name: observation.resource_name.clone(),
            metric_name: pair.combined.to_string(),
            dimension_name: observation.dimension_name.clone(),
            sequence_number: observation.sequence_number,
            value: observation.value + other.value,
            timestamp: observation.timestamp,
        })
    }

    /// Attempt every fixed pair for one observation
    pub fn combine_all(&self, observation: &MetricObservation) -> Vec<CombinedMetric> {
        CORRELATION_PAIRS
            .iter()
            .filter_map(|pair| self.combine(pair, observation))
            .collect()
    }

    /// Number of cached values
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

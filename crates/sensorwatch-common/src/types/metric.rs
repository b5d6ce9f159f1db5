//! Metric points and monitoring API request types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Measurement unit of a submitted metric point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricUnit {
    Bytes,
    Count,
    Seconds,
    Percent,
}

impl MetricUnit {
    /// Unit name as the monitoring API expects it
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricUnit::Bytes => "Bytes",
            MetricUnit::Count => "Count",
            MetricUnit::Seconds => "Seconds",
            MetricUnit::Percent => "Percent",
        }
    }
}

impl fmt::Display for MetricUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single raw or derived value headed for the monitoring API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricObservation {
    /// Instance the value belongs to
    pub resource_uuid: String,
    pub resource_name: String,
    pub metric_name: String,
    /// Dimension identity, a volume id for block-storage series
    pub dimension_name: String,
    pub sequence_number: i64,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// Synthetic metric summed from two correlated raw counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedMetric {
    pub resource_uuid: String,
    pub resource_name: String,
    /// One of the fixed derived names
    pub metric_name: String,
    pub dimension_name: String,
    pub sequence_number: i64,
    /// Sum of both raw values
    pub value: f64,
    /// Timestamp of the observation that completed the pair
    pub timestamp: DateTime<Utc>,
}

impl From<CombinedMetric> for MetricObservation {
    fn from(combined: CombinedMetric) -> Self {
        Self {
            resource_uuid: combined.resource_uuid,
            resource_name: combined.resource_name,
            metric_name: combined.metric_name,
            dimension_name: combined.dimension_name,
            sequence_number: combined.sequence_number,
            value: combined.value,
            timestamp: combined.timestamp,
        }
    }
}

/// Name/value pair attached to a metric datum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDatum {
    pub metric_name: String,
    pub unit: MetricUnit,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub dimensions: Vec<Dimension>,
}

/// Single-point submission to the monitoring API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PutMetricData {
    pub namespace: String,
    pub datum: MetricDatum,
    /// Effective principal the point is recorded under
    pub principal_id: String,
}

//! Sensor batch data model
//!
//! One collection cycle arrives as a [`SensorBatch`] shaped
//! resource → metric → counter → dimension → timed values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Resource type of samples that describe compute instances
pub const RESOURCE_TYPE_INSTANCE: &str = "instance";

/// One collection cycle of sensor data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorBatch {
    /// Samples in the order the sensor reported them
    pub resources: Vec<ResourceSample>,
}

impl SensorBatch {
    pub fn new(resources: Vec<ResourceSample>) -> Self {
        Self { resources }
    }

    /// Number of resource samples
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Check if batch is empty
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Total number of timed values across every dimension
    pub fn value_count(&self) -> usize {
        self.resources
            .iter()
            .flat_map(|r| r.metrics.iter())
            .flat_map(|m| m.counters.iter())
            .flat_map(|c| c.dimensions.iter())
            .map(|d| d.values.len())
            .sum()
    }
}

/// Metrics reported for a single resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSample {
    pub resource_type: String,
    #[serde(rename = "resourceUUID")]
    pub resource_uuid: String,
    pub resource_name: String,
    #[serde(default)]
    pub metrics: Vec<MetricSeries>,
}

impl ResourceSample {
    /// Create an instance-typed sample
    pub fn instance(resource_uuid: impl Into<String>, resource_name: impl Into<String>) -> Self {
        Self {
            resource_type: RESOURCE_TYPE_INSTANCE.to_string(),
            resource_uuid: resource_uuid.into(),
            resource_name: resource_name.into(),
            metrics: Vec::new(),
        }
    }

    /// Add a metric series
    pub fn with_metric(mut self, metric: MetricSeries) -> Self {
        self.metrics.push(metric);
        self
    }

    /// Whether this sample describes a compute instance
    pub fn is_instance(&self) -> bool {
        self.resource_type == RESOURCE_TYPE_INSTANCE
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSeries {
    pub metric_name: String,
    #[serde(default)]
    pub counters: Vec<CounterSeries>,
}

impl MetricSeries {
    pub fn new(metric_name: impl Into<String>) -> Self {
        Self {
            metric_name: metric_name.into(),
            counters: Vec::new(),
        }
    }

    /// Add a counter holding the given dimensions
    pub fn with_counter(mut self, counter: CounterSeries) -> Self {
        self.counters.push(counter);
        self
    }

    /// Shorthand for a metric with one counter and one dimension
    pub fn single(metric_name: impl Into<String>, dimension: DimensionSeries) -> Self {
        Self::new(metric_name).with_counter(CounterSeries::new(vec![dimension]))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterSeries {
    /// Counter kind as labelled by the sensor (e.g. "summation")
    #[serde(default, rename = "type")]
    pub counter_type: Option<String>,
    /// Interval the sensor sampled this counter at
    #[serde(default)]
    pub collection_interval_ms: Option<u64>,
    #[serde(default)]
    pub dimensions: Vec<DimensionSeries>,
}

impl CounterSeries {
    pub fn new(dimensions: Vec<DimensionSeries>) -> Self {
        Self {
            counter_type: None,
            collection_interval_ms: None,
            dimensions,
        }
    }
}

/// A named sub-series of a counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionSeries {
    pub dimension_name: String,
    /// Base offset of the first value in this series
    #[serde(rename = "sequenceNum")]
    pub sequence_number: i64,
    #[serde(default)]
    pub values: Vec<TimedValue>,
}

impl DimensionSeries {
    pub fn new(dimension_name: impl Into<String>, sequence_number: i64, values: Vec<TimedValue>) -> Self {
        Self {
            dimension_name: dimension_name.into(),
            sequence_number,
            values,
        }
    }

    /// Values sorted oldest first.
    ///
    /// The sort is stable, so values sharing a timestamp keep their reported order.
    pub fn ordered_values(&self) -> Vec<TimedValue> {
        let mut values = self.values.clone();
        values.sort_by_key(|v| v.timestamp);
        values
    }

    /// Accounting index of the newest value, given the number of values in the series
    pub fn latest_sequence_index(&self, value_count: usize) -> i64 {
        self.sequence_number
            .saturating_add(value_count.saturating_sub(1) as i64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedValue {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl TimedValue {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_ordered_values_sorts_by_timestamp() {
        let dim = DimensionSeries::new(
            "default",
            10,
            vec![
                TimedValue::new(ts(1), 3.0),
                TimedValue::new(ts(3), 9.0),
                TimedValue::new(ts(2), 5.0),
            ],
        );

        let ordered = dim.ordered_values();
        let values: Vec<f64> = ordered.iter().map(|v| v.value).collect();
        assert_eq!(values, vec![3.0, 5.0, 9.0]);
        assert_eq!(dim.latest_sequence_index(ordered.len()), 12);
    }

    #[test]
    fn test_ordered_values_keeps_ties_in_reported_order() {
        let dim = DimensionSeries::new(
            "default",
            0,
            vec![
                TimedValue::new(ts(5), 1.0),
                TimedValue::new(ts(1), 2.0),
                TimedValue::new(ts(5), 3.0),
            ],
        );

        let values: Vec<f64> = dim.ordered_values().iter().map(|v| v.value).collect();
        assert_eq!(values, vec![2.0, 1.0, 3.0]);
    }

    #[test]
    fn test_latest_sequence_index_saturates() {
        let dim = DimensionSeries::new("default", i64::MAX - 1, vec![]);
        assert_eq!(dim.latest_sequence_index(5), i64::MAX);
        assert_eq!(dim.latest_sequence_index(0), i64::MAX - 1);
    }

    #[test]
    fn test_batch_deserializes_sensor_json() {
        let json = r#"{
            "resources": [{
                "resourceType": "instance",
                "resourceUUID": "i-1234",
                "resourceName": "i-1234",
                "metrics": [{
                    "metricName": "CPUUtilization",
                    "counters": [{
                        "type": "summation",
                        "collectionIntervalMs": 20000,
                        "dimensions": [{
                            "dimensionName": "default",
                            "sequenceNum": 7,
                            "values": [{"timestamp": "2024-01-01T00:00:00Z", "value": 42.0}]
                        }]
                    }]
                }]
            }]
        }"#;

        let batch: SensorBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.len(), 1);
        assert!(batch.resources[0].is_instance());
        assert_eq!(batch.value_count(), 1);
        let dim = &batch.resources[0].metrics[0].counters[0].dimensions[0];
        assert_eq!(dim.sequence_number, 7);
        assert_eq!(dim.values[0].value, 42.0);
    }

    proptest! {
        #[test]
        fn prop_ordered_values_non_decreasing_and_stable(
            raw in proptest::collection::vec((0i64..20, -1000.0f64..1000.0), 0..40)
        ) {
            // Tag each value with its input position through the value field
            let values: Vec<TimedValue> = raw
                .iter()
                .enumerate()
                .map(|(i, (secs, _))| TimedValue::new(ts(*secs), i as f64))
                .collect();
            let dim = DimensionSeries::new("default", 0, values);
            let ordered = dim.ordered_values();

            prop_assert_eq!(ordered.len(), raw.len());
            for pair in ordered.windows(2) {
                prop_assert!(pair[0].timestamp <= pair[1].timestamp);
                if pair[0].timestamp == pair[1].timestamp {
                    prop_assert!(pair[0].value < pair[1].value);
                }
            }
        }
    }
}

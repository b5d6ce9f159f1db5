//! Metric unit classification
//!
//! Every metric name the sensors report belongs to exactly one unit set.
//! Names outside the table have no unit and cannot be submitted.

use lazy_static::lazy_static;
use sensorwatch_common::{DispatchError, MetricUnit};
use std::collections::HashMap;

const BYTES: &[&str] = &[
    "VolumeReadBytes",
    "VolumeWriteBytes",
    "DiskReadBytes",
    "DiskWriteBytes",
    "NetworkIn",
    "NetworkInExternal",
    "NetworkOut",
    "NetworkOutExternal",
];

const COUNT: &[&str] = &[
    "VolumeWriteOps",
    "VolumeQueueLength",
    "VolumeConsumedReadWriteOps",
    "DiskReadOps",
    "DiskWriteOps",
    "StatusCheckFailed",
    "VolumeReadOps",
];

const SECONDS: &[&str] = &[
    "VolumeTotalReadTime",
    "VolumeTotalWriteTime",
    "VolumeTotalReadWriteTime",
    "VolumeIdleTime",
];

const PERCENT: &[&str] = &["VolumeThroughputPercentage", "CPUUtilization"];

lazy_static! {
    static ref UNIT_TABLE: HashMap<&'static str, MetricUnit> = {
        let mut table = HashMap::new();
        for (names, unit) in [
            (BYTES, MetricUnit::Bytes),
            (COUNT, MetricUnit::Count),
            (SECONDS, MetricUnit::Seconds),
            (PERCENT, MetricUnit::Percent),
        ] {
            for name in names {
                table.insert(*name, unit);
            }
        }
        table
    };
}

/// Look up the unit of a metric name
pub fn unit_of(metric_name: &str) -> Option<MetricUnit> {
    UNIT_TABLE.get(metric_name).copied()
}

/// Classify a metric name, failing for names outside the taxonomy
pub fn classify(metric_name: &str) -> Result<MetricUnit, DispatchError> {
    unit_of(metric_name).ok_or_else(|| DispatchError::UnknownUnit {
        metric: metric_name.to_string(),
    })
}

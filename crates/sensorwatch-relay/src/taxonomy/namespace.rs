//! Namespace and metric-name mapping for monitoring submissions
//!
//! Volume-scoped series go to the block-storage namespace under their
//! volume name, instance-scoped series go to the compute namespace.
//! Several counters are cumulative totals since resource creation and are
//! published under an `Absolute` name so consumers do not read them as deltas.

use lazy_static::lazy_static;
use sensorwatch_common::VOLUME_ID_PREFIX;
use std::collections::{HashMap, HashSet};
use std::fmt;

lazy_static! {
    /// Metrics the compute namespace does not accept
    static ref UNSUPPORTED_COMPUTE_METRICS: HashSet<&'static str> = [
        "VolumeQueueLength",
        "VolumeTotalReadTime",
        "VolumeTotalWriteTime",
        "VolumeTotalReadWriteTime",
        "VolumeConsumedReadWriteOps",
        "DiskTotalReadTime",
        "DiskTotalWriteTime",
        "DiskConsumedReadWriteOps",
    ]
    .into_iter()
    .collect();

    /// Cumulative counters and the names they are published under
    static ref ABSOLUTE_METRICS: HashMap<&'static str, &'static str> = [
        // reported in milliseconds of CPU time, not a percentage
        ("CPUUtilization", "CPUUtilizationMSAbsolute"),
        ("VolumeReadOps", "VolumeReadOpsAbsolute"),
        ("VolumeWriteOps", "VolumeWriteOpsAbsolute"),
        ("VolumeConsumedReadWriteOps", "VolumeConsumedReadWriteOpsAbsolute"),
        ("VolumeReadBytes", "VolumeReadBytesAbsolute"),
        ("VolumeWriteBytes", "VolumeWriteBytesAbsolute"),
        ("VolumeTotalReadTime", "VolumeTotalReadTimeAbsolute"),
        ("VolumeTotalWriteTime", "VolumeTotalWriteTimeAbsolute"),
        ("VolumeTotalReadWriteTime", "VolumeTotalReadWriteTimeAbsolute"),
        ("DiskReadOps", "DiskReadOpsAbsolute"),
        ("DiskWriteOps", "DiskWriteOpsAbsolute"),
        ("DiskReadBytes", "DiskReadBytesAbsolute"),
        ("DiskWriteBytes", "DiskWriteBytesAbsolute"),
        ("NetworkIn", "NetworkInAbsolute"),
        ("NetworkInExternal", "NetworkInExternalAbsolute"),
        ("NetworkOut", "NetworkOutAbsolute"),
        ("NetworkOutExternal", "NetworkOutExternalAbsolute"),
    ]
    .into_iter()
    .collect();
}

/// Monitoring namespace a point is submitted under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Instance-scoped metrics
    Compute,
    /// Volume-scoped metrics
    BlockStorage,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Compute => "AWS/EC2",
            Namespace::BlockStorage => "AWS/EBS",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and under which names a metric is submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRoute {
    pub namespace: Namespace,
    /// Name after namespace renaming, used for unit classification
    pub metric_name: String,
    /// Name the point is finally published under
    pub output_name: String,
}

impl MetricRoute {
    fn new(namespace: Namespace, metric_name: String) -> Self {
        let output_name = absolute_name(&metric_name)
            .map(str::to_string)
            .unwrap_or_else(|| metric_name.clone());
        Self {
            namespace,
            metric_name,
            output_name,
        }
    }

    /// Whether the published name differs because the metric is cumulative
    pub fn is_absolute(&self) -> bool {
        self.metric_name != self.output_name
    }
}

/// Mapping result for one metric emission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingDecision {
    Route(MetricRoute),
    /// Not supported in the target namespace; dropped without error
    Suppressed,
}

/// Whether a dimension identity names a block-storage volume
pub fn is_volume_identity(dimension_identity: &str) -> bool {
    dimension_identity.starts_with(VOLUME_ID_PREFIX)
}

/// Published name for a cumulative metric, if it is one
pub fn absolute_name(metric_name: &str) -> Option<&'static str> {
    ABSOLUTE_METRICS.get(metric_name).copied()
}

/// Whether the compute namespace rejects this metric
pub fn is_unsupported_for_compute(metric_name: &str) -> bool {
    UNSUPPORTED_COMPUTE_METRICS.contains(metric_name)
}

/// Decide namespace and names for a metric observed under a dimension identity
pub fn map_for_submission(metric_name: &str, dimension_identity: &str) -> MappingDecision {
    if is_volume_identity(dimension_identity) {
        let renamed = match metric_name.strip_prefix("Disk") {
            Some(rest) => format!("Volume{}", rest),
            None => metric_name.to_string(),
        };
        return MappingDecision::Route(MetricRoute::new(Namespace::BlockStorage, renamed));
    }

    if is_unsupported_for_compute(metric_name) {
        return MappingDecision::Suppressed;
    }
    MappingDecision::Route(MetricRoute::new(Namespace::Compute, metric_name.to_string()))
}

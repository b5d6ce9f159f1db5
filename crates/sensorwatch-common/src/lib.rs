//! # SensorWatch Common
//!
//! Shared types and errors for the SensorWatch metrics relay.
//!
//! ## Core Types
//!
//! - [`SensorBatch`]: one collection cycle of hierarchical resource samples
//! - [`MetricObservation`]/[`CombinedMetric`]: points headed for the monitoring API
//! - [`UsageEvent`]: the latest value of a dimension, headed for usage accounting
//! - [`InstanceDescriptor`]: live instance context resolved from the registry
//! - [`MetricUnit`]: measurement unit attached to every submitted point

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{CollaboratorError, DispatchError, Result, SensorwatchError};
pub use types::{
    instance::{InstanceDescriptor, VOLUME_ID_PREFIX},
    metric::{CombinedMetric, Dimension, MetricDatum, MetricObservation, MetricUnit, PutMetricData},
    sensor::{
        CounterSeries, DimensionSeries, MetricSeries, ResourceSample, SensorBatch, TimedValue,
        RESOURCE_TYPE_INSTANCE,
    },
    usage::UsageEvent,
};

/// SensorWatch version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of historical values the sensor reports per dimension
pub const DEFAULT_HISTORY_SIZE: u32 = 5;

/// Default collection interval in milliseconds
pub const DEFAULT_COLLECTION_INTERVAL_MS: u64 = 60_000;

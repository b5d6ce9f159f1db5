//! Metric taxonomy
//!
//! Pure lookups over the fixed metric-name tables:
//! - unit: metric name → measurement unit
//! - namespace: metric name + dimension identity → namespace and published name

pub mod namespace;
pub mod unit;

pub use namespace::{
    absolute_name, is_volume_identity, map_for_submission, MappingDecision, MetricRoute, Namespace,
};
pub use unit::{classify, unit_of};

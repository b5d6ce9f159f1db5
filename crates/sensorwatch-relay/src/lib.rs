//! # SensorWatch Relay
//!
//! Sensor batch correlation, monitoring submission, and usage accounting.
//!
//! ## Pipeline
//!
//! ```text
//! SensorBatch ─► running-instance filter ─► order values per dimension
//!                                              │
//!              ┌───────────────────────────────┴──────────────┐
//!              ▼                                              ▼
//!   every value + combined pairs                     newest value only
//!   ─► namespace / unit / absolute name              ─► UsageEvent
//!   ─► monitoring API (one point per call)           ─► event bus
//! ```
//!
//! Derived metrics:
//! - DiskReadOps + DiskWriteOps = DiskConsumedReadWriteOps
//! - VolumeReadOps + VolumeWriteOps = VolumeConsumedReadWriteOps
//! - VolumeTotalReadTime + VolumeTotalWriteTime = VolumeTotalReadWriteTime

pub mod collaborators;
pub mod config;
pub mod correlation;
pub mod dispatch;
pub mod memory;
pub mod metrics;
pub mod pipeline;
pub mod poller;
pub mod taxonomy;

pub use collaborators::{
    AccountDirectory, EventBus, InstanceRegistry, MonitoringApi, MonitoringReply, SensorSource,
};
pub use config::{RelayConfig, UsageGating};
pub use correlation::{CorrelationCache, CorrelationKey, CorrelationPair, CORRELATION_PAIRS};
pub use dispatch::{ChannelEventBus, MonitoringSink, SubmitOutcome, UsageSink};
pub use metrics::RelayMetrics;
pub use pipeline::{BatchProcessor, BatchReport};
pub use poller::{SensorPoller, SensorRequest};

//! Dispatch module
//!
//! The two outputs of a processed batch:
//! - MonitoringSink: single-point submissions to the external monitoring API
//! - UsageSink: best-effort usage events on the internal event bus

pub mod monitoring;
pub mod usage;

pub use monitoring::{MonitoringSink, SubmitOutcome};
pub use usage::{ChannelEventBus, EventBusMetrics, UsageSink};

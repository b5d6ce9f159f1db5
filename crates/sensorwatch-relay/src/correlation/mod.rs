//! Correlation module
//!
//! Derives combined metrics from pairs of raw counters observed at the same
//! resource, dimension, and timestamp.

pub mod cache;

pub use cache::{CorrelationCache, CorrelationKey, CorrelationPair, CORRELATION_PAIRS};

//! Core types for SensorWatch

pub mod instance;
pub mod metric;
pub mod sensor;
pub mod usage;

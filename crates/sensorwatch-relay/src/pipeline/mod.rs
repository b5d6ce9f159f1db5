//! Batch processing pipeline
//!
//! - BatchProcessor: walks a sensor batch and drives both dispatch paths
//! - BatchReport: outcome counts for one batch

pub mod processor;
pub mod report;

pub use processor::BatchProcessor;
pub use report::BatchReport;

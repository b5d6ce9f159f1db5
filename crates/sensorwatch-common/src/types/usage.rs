//! Usage-accounting event

use crate::{Result, SensorwatchError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Latest value of one dimension series, published once per cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEvent {
    /// Unique event ID
    pub event_id: Uuid,
    /// Instance (or resource) the value was measured on
    pub resource_uuid: String,
    pub resource_name: String,
    pub metric_name: String,
    /// Global accounting index of this value
    pub sequence_index: i64,
    pub dimension_name: String,
    pub value: f64,
    /// Measurement time of the value
    pub timestamp: DateTime<Utc>,
}

impl UsageEvent {
    /// Create a new usage event
    pub fn new(
        resource_uuid: String,
        resource_name: String,
        metric_name: String,
        sequence_index: i64,
        dimension_name: String,
        value: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            resource_uuid,
            resource_name,
            metric_name,
            sequence_index,
            dimension_name,
            value,
            timestamp,
        }
    }

    /// Validate the event
    pub fn validate(&self) -> Result<()> {
        if self.resource_uuid.is_empty() {
            return Err(SensorwatchError::Validation("resource_uuid is required".into()));
        }
        if self.metric_name.is_empty() {
            return Err(SensorwatchError::Validation("metric_name is required".into()));
        }
        if self.dimension_name.is_empty() {
            return Err(SensorwatchError::Validation("dimension_name is required".into()));
        }
        if !self.value.is_finite() {
            return Err(SensorwatchError::Validation("value must be finite".into()));
        }
        Ok(())
    }
}

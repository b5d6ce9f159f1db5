//! Error types for SensorWatch
//!
//! Provides a unified error type and the per-submission failure taxonomy

use thiserror::Error;

/// Result type alias using SensorwatchError
pub type Result<T> = std::result::Result<T, SensorwatchError>;

/// Unified error type for SensorWatch operations
#[derive(Debug, Error)]
pub enum SensorwatchError {
    // Per-submission failures
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    // External collaborator failures
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Reasons a single metric point was not submitted to the monitoring API
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Instance not found: {resource_id}")]
    InstanceNotFound { resource_id: String },

    #[error("Instance {instance_id} monitoring is not enabled")]
    MonitoringDisabled { instance_id: String },

    #[error("Observation is missing its {0}")]
    MissingField(&'static str),

    #[error("Unknown system unit type: {metric}")]
    UnknownUnit { metric: String },

    #[error("Monitoring API rejected submission: {0}")]
    Rejected(String),
}

impl DispatchError {
    /// Short label used for metrics and structured logs
    pub fn reason(&self) -> &'static str {
        match self {
            DispatchError::InstanceNotFound { .. } => "instance_not_found",
            DispatchError::MonitoringDisabled { .. } => "monitoring_disabled",
            DispatchError::MissingField(_) => "missing_field",
            DispatchError::UnknownUnit { .. } => "unknown_unit",
            DispatchError::Rejected(_) => "rejected",
        }
    }
}

/// Transport failures reported by external collaborators
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("Instance registry unavailable: {0}")]
    Registry(String),

    #[error("Account lookup failed for {account_id}: {reason}")]
    Account { account_id: String, reason: String },

    #[error("Monitoring API transport failed: {0}")]
    Monitoring(String),

    #[error("Event bus delivery failed: {0}")]
    EventBus(String),

    #[error("Sensor source failed: {0}")]
    SensorSource(String),
}

impl SensorwatchError {
    /// Short label used for metrics and structured logs
    pub fn reason(&self) -> &'static str {
        match self {
            SensorwatchError::Dispatch(e) => e.reason(),
            SensorwatchError::Collaborator(_) => "collaborator",
            SensorwatchError::Validation(_) => "validation",
            SensorwatchError::Config(_) => "config",
            SensorwatchError::Serialization(_) => "serialization",
            SensorwatchError::Internal(_) => "internal",
        }
    }
}

// Implement From for common external error types
impl From<serde_json::Error> for SensorwatchError {
    fn from(err: serde_json::Error) -> Self {
        SensorwatchError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for SensorwatchError {
    fn from(err: anyhow::Error) -> Self {
        SensorwatchError::Internal(err.to_string())
    }
}

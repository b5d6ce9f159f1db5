//! External collaborator interfaces
//!
//! The relay owns none of these systems. It only needs the calls below,
//! each of which may fail with a transport-level [`CollaboratorError`].

use async_trait::async_trait;
use sensorwatch_common::{CollaboratorError, InstanceDescriptor, PutMetricData, SensorBatch, UsageEvent};
use std::collections::HashSet;

use crate::poller::SensorRequest;

/// Registry of live compute instances
#[async_trait]
pub trait InstanceRegistry: Send + Sync {
    /// Ids of every instance currently running
    async fn list_running_resource_ids(&self) -> Result<HashSet<String>, CollaboratorError>;

    /// Resolve an instance id to its live descriptor
    async fn lookup_instance(
        &self,
        resource_id: &str,
    ) -> Result<Option<InstanceDescriptor>, CollaboratorError>;
}

/// Account lookup for the principal a submission is recorded under
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn resolve_submission_principal(
        &self,
        owner_account_id: &str,
    ) -> Result<String, CollaboratorError>;
}

/// Reply from the monitoring API to a single submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitoringReply {
    /// The expected acknowledgment
    Accepted,
    /// Any other reply type
    Unexpected(String),
}

/// External monitoring API
#[async_trait]
pub trait MonitoringApi: Send + Sync {
    async fn put_metric_data(&self, request: PutMetricData)
        -> Result<MonitoringReply, CollaboratorError>;
}

/// Internal event bus accepting usage-accounting events
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: UsageEvent) -> Result<(), CollaboratorError>;
}

/// Source of sensor batches, one per collection cycle
#[async_trait]
pub trait SensorSource: Send + Sync {
    async fn describe_sensors(&self, request: &SensorRequest)
        -> Result<SensorBatch, CollaboratorError>;
}

//! In-memory collaborators
//!
//! Process-local implementations of the collaborator traits, used by the
//! replay binary and by tests. Each can be switched into a failing mode.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use sensorwatch_common::{CollaboratorError, InstanceDescriptor, PutMetricData, SensorBatch};
use std::collections::{HashMap, HashSet};

use crate::collaborators::{
    AccountDirectory, InstanceRegistry, MonitoringApi, MonitoringReply, SensorSource,
};
use crate::poller::SensorRequest;

/// Instance registry backed by a map of descriptors
#[derive(Debug, Default)]
pub struct InMemoryInstanceRegistry {
    instances: RwLock<HashMap<String, InstanceDescriptor>>,
    running: RwLock<HashSet<String>>,
    /// Resource ids whose lookup fails with a transport error
    unreachable: RwLock<HashSet<String>>,
    unavailable: RwLock<bool>,
}

impl InMemoryInstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a running instance
    pub fn with_instance(self, descriptor: InstanceDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    pub fn insert(&self, descriptor: InstanceDescriptor) {
        self.running.write().insert(descriptor.instance_id.clone());
        self.instances
            .write()
            .insert(descriptor.instance_id.clone(), descriptor);
    }

    /// Register a descriptor under a resource id it does not carry
    pub fn insert_alias(&self, resource_id: &str, descriptor: InstanceDescriptor) {
        self.running.write().insert(resource_id.to_string());
        self.instances.write().insert(resource_id.to_string(), descriptor);
    }

    /// Mark an instance as no longer running; its descriptor stays resolvable
    pub fn stop(&self, instance_id: &str) {
        self.running.write().remove(instance_id);
    }

    /// Make lookups of one resource fail
    pub fn set_unreachable(&self, resource_id: &str) {
        self.unreachable.write().insert(resource_id.to_string());
    }

    /// Make every call fail
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write() = unavailable;
    }

    fn check_available(&self) -> Result<(), CollaboratorError> {
        if *self.unavailable.read() {
            return Err(CollaboratorError::Registry("registry unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl InstanceRegistry for InMemoryInstanceRegistry {
    async fn list_running_resource_ids(&self) -> Result<HashSet<String>, CollaboratorError> {
        self.check_available()?;
        Ok(self.running.read().clone())
    }

    async fn lookup_instance(
        &self,
        resource_id: &str,
    ) -> Result<Option<InstanceDescriptor>, CollaboratorError> {
        self.check_available()?;
        if self.unreachable.read().contains(resource_id) {
            return Err(CollaboratorError::Registry(format!(
                "lookup of {} timed out",
                resource_id
            )));
        }
        Ok(self.instances.read().get(resource_id).cloned())
    }
}

/// Account directory resolving principals from a fixed map
#[derive(Debug, Default)]
pub struct StaticAccountDirectory {
    principals: HashMap<String, String>,
}

impl StaticAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_principal(mut self, account_id: &str, principal_id: &str) -> Self {
        self.principals
            .insert(account_id.to_string(), principal_id.to_string());
        self
    }
}

impl From<HashMap<String, String>> for StaticAccountDirectory {
    fn from(principals: HashMap<String, String>) -> Self {
        Self { principals }
    }
}

#[async_trait]
impl AccountDirectory for StaticAccountDirectory {
    async fn resolve_submission_principal(
        &self,
        owner_account_id: &str,
    ) -> Result<String, CollaboratorError> {
        self.principals
            .get(owner_account_id)
            .cloned()
            .ok_or_else(|| CollaboratorError::Account {
                account_id: owner_account_id.to_string(),
                reason: "no administrator principal".into(),
            })
    }
}

/// Failure mode of the recording monitoring API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitoringMode {
    #[default]
    Accept,
    /// Reply with something other than the acknowledgment
    Reject,
    /// Fail at the transport level
    Unreachable,
}

/// Monitoring API that keeps every accepted submission
#[derive(Debug, Default)]
pub struct RecordingMonitoringApi {
    submissions: Mutex<Vec<PutMetricData>>,
    mode: RwLock<MonitoringMode>,
}

impl RecordingMonitoringApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_mode(&self, mode: MonitoringMode) {
        *self.mode.write() = mode;
    }

    /// Accepted submissions, in arrival order
    pub fn submissions(&self) -> Vec<PutMetricData> {
        self.submissions.lock().clone()
    }

    /// Published names of accepted submissions, in arrival order
    pub fn metric_names(&self) -> Vec<String> {
        self.submissions
            .lock()
            .iter()
            .map(|s| s.datum.metric_name.clone())
            .collect()
    }
}

#[async_trait]
impl MonitoringApi for RecordingMonitoringApi {
    async fn put_metric_data(
        &self,
        request: PutMetricData,
    ) -> Result<MonitoringReply, CollaboratorError> {
        let mode = *self.mode.read();
        match mode {
            MonitoringMode::Accept => {
                self.submissions.lock().push(request);
                Ok(MonitoringReply::Accepted)
            }
            MonitoringMode::Reject => Ok(MonitoringReply::Unexpected("ErrorResponse".into())),
            MonitoringMode::Unreachable => {
                Err(CollaboratorError::Monitoring("connection refused".into()))
            }
        }
    }
}

/// Sensor source returning a fixed batch
#[derive(Debug, Default)]
pub struct StaticSensorSource {
    batch: Option<SensorBatch>,
    requests: Mutex<Vec<SensorRequest>>,
}

impl StaticSensorSource {
    pub fn new(batch: SensorBatch) -> Self {
        Self {
            batch: Some(batch),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A source whose every fetch fails
    pub fn failing() -> Self {
        Self::default()
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<SensorRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl SensorSource for StaticSensorSource {
    async fn describe_sensors(
        &self,
        request: &SensorRequest,
    ) -> Result<SensorBatch, CollaboratorError> {
        self.requests.lock().push(request.clone());
        self.batch
            .clone()
            .ok_or_else(|| CollaboratorError::SensorSource("no sensor data".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registry_lookup_and_stop() {
        let registry = InMemoryInstanceRegistry::new()
            .with_instance(InstanceDescriptor::new("i-1", "emi-1", "m1.small", "000001"));

        assert!(registry.lookup_instance("i-1").await.unwrap().is_some());
        assert!(registry.lookup_instance("i-2").await.unwrap().is_none());

        registry.stop("i-1");
        assert!(registry.list_running_resource_ids().await.unwrap().is_empty());
        assert!(registry.lookup_instance("i-1").await.unwrap().is_some());

        registry.set_unavailable(true);
        assert!(registry.list_running_resource_ids().await.is_err());
    }

    #[tokio::test]
    async fn test_account_directory() {
        let accounts = StaticAccountDirectory::new().with_principal("000001", "AIDADMIN1");
        assert_eq!(
            accounts.resolve_submission_principal("000001").await.unwrap(),
            "AIDADMIN1"
        );
        assert!(accounts.resolve_submission_principal("000002").await.is_err());
    }
}

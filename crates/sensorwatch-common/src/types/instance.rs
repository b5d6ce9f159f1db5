//! Instance registry descriptor

use serde::{Deserialize, Serialize};

/// Dimension identities with this prefix denote block-storage volumes
pub const VOLUME_ID_PREFIX: &str = "vol-";

/// Live descriptor of a running instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceDescriptor {
    pub instance_id: String,
    pub image_id: String,
    /// Display name of the instance type
    pub vm_type: String,
    pub owner_account_id: String,
    pub monitoring_enabled: bool,
}

impl InstanceDescriptor {
    pub fn new(
        instance_id: impl Into<String>,
        image_id: impl Into<String>,
        vm_type: impl Into<String>,
        owner_account_id: impl Into<String>,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            image_id: image_id.into(),
            vm_type: vm_type.into(),
            owner_account_id: owner_account_id.into(),
            monitoring_enabled: true,
        }
    }

    /// Set the monitoring flag
    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitoring_enabled = enabled;
        self
    }
}

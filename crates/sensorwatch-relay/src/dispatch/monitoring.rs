//! Monitoring API submission path
//!
//! Every raw or combined observation becomes at most one single-point
//! submission, tagged with namespace, dimensions, unit, and published name.

use sensorwatch_common::{
    Dimension, DispatchError, InstanceDescriptor, MetricDatum, MetricObservation, PutMetricData,
    Result,
};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::collaborators::{AccountDirectory, InstanceRegistry, MonitoringApi, MonitoringReply};
use crate::taxonomy::{classify, map_for_submission, MappingDecision, MetricRoute, Namespace};

/// Result of a submission attempt that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// One point was accepted by the monitoring API
    Submitted,
    /// The metric is not supported in its namespace and was dropped
    Suppressed,
}

/// Submits observations to the external monitoring API
pub struct MonitoringSink {
    registry: Arc<dyn InstanceRegistry>,
    accounts: Arc<dyn AccountDirectory>,
    api: Arc<dyn MonitoringApi>,
}

impl MonitoringSink {
    pub fn new(
        registry: Arc<dyn InstanceRegistry>,
        accounts: Arc<dyn AccountDirectory>,
        api: Arc<dyn MonitoringApi>,
    ) -> Self {
        Self {
            registry,
            accounts,
            api,
        }
    }

    /// Submit one observation as a single metric point
    #[instrument(skip(self, observation), fields(
        resource = %observation.resource_uuid,
        metric = %observation.metric_name,
        dimension = %observation.dimension_name,
    ))]
    pub async fn submit(&self, observation: &MetricObservation) -> Result<SubmitOutcome> {
        let instance = self.resolve_instance(&observation.resource_uuid).await?;

        if observation.dimension_name.is_empty() {
            return Err(DispatchError::MissingField("dimension").into());
        }
        if !observation.value.is_finite() {
            return Err(DispatchError::MissingField("value").into());
        }

        let route = match map_for_submission(&observation.metric_name, &observation.dimension_name) {
            MappingDecision::Route(route) => route,
            MappingDecision::Suppressed => {
                debug!("Metric not supported for compute namespace, suppressed");
                return Ok(SubmitOutcome::Suppressed);
            }
        };
        let unit = classify(&route.metric_name)?;

        let principal_id = self
            .accounts
            .resolve_submission_principal(&instance.owner_account_id)
            .await?;

        let request = PutMetricData {
            namespace: route.namespace.as_str().to_string(),
            datum: MetricDatum {
                metric_name: route.output_name.clone(),
                unit,
                timestamp: observation.timestamp,
                value: observation.value,
                dimensions: submission_dimensions(&route, observation, &instance),
            },
            principal_id,
        };

        match self.api.put_metric_data(request).await? {
            MonitoringReply::Accepted => {
                debug!(
                    namespace = %route.namespace,
                    published = %route.output_name,
                    %unit,
                    value = observation.value,
                    "Submitted metric point"
                );
                Ok(SubmitOutcome::Submitted)
            }
            MonitoringReply::Unexpected(reply) => Err(DispatchError::Rejected(reply).into()),
        }
    }

    /// Resolve the instance a submission belongs to, requiring monitoring to be on
    pub async fn resolve_instance(&self, resource_id: &str) -> Result<InstanceDescriptor> {
        let instance = self
            .registry
            .lookup_instance(resource_id)
            .await?
            .filter(|instance| instance.instance_id == resource_id)
            .ok_or_else(|| DispatchError::InstanceNotFound {
                resource_id: resource_id.to_string(),
            })?;

        if !instance.monitoring_enabled {
            return Err(DispatchError::MonitoringDisabled {
                instance_id: instance.instance_id,
            }
            .into());
        }
        Ok(instance)
    }
}

fn submission_dimensions(
    route: &MetricRoute,
    observation: &MetricObservation,
    instance: &InstanceDescriptor,
) -> Vec<Dimension> {
    match route.namespace {
        Namespace::BlockStorage => vec![Dimension::new("VolumeId", &observation.dimension_name)],
        Namespace::Compute => vec![
            Dimension::new("InstanceId", &instance.instance_id),
            Dimension::new("ImageId", &instance.image_id),
            Dimension::new("InstanceType", &instance.vm_type),
        ],
    }
}

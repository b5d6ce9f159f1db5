//! SensorWatch Relay replay binary
//!
//! Runs one collection cycle over a recorded sensor batch.
//!
//! ```text
//! sensorwatch-relay <batch.json> <inventory.json>
//! ```
//!
//! The inventory lists the running instances and the submission principal of
//! each owner account:
//!
//! ```text
//! { "instances": [ { "instanceId": "i-1", ... } ], "principals": { "000001": "AIDA..." } }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sensorwatch_common::{InstanceDescriptor, SensorBatch, VERSION};
use sensorwatch_relay::{
    memory::{InMemoryInstanceRegistry, RecordingMonitoringApi, StaticAccountDirectory, StaticSensorSource},
    BatchProcessor, ChannelEventBus, RelayConfig, RelayMetrics, SensorPoller,
};

#[derive(Debug, Deserialize)]
struct Inventory {
    instances: Vec<InstanceDescriptor>,
    #[serde(default)]
    principals: HashMap<String, String>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        bail!("usage: {} <batch.json> <inventory.json>", args[0]);
    }

    info!("Starting SensorWatch Relay replay v{}", VERSION);

    let config = RelayConfig::load()?;
    info!("Loaded configuration: {:?}", config);

    let batch: SensorBatch = read_json(Path::new(&args[1]))?;
    let inventory: Inventory = read_json(Path::new(&args[2]))?;
    info!(
        resources = batch.len(),
        values = batch.value_count(),
        instances = inventory.instances.len(),
        "Loaded batch and inventory"
    );

    let registry = Arc::new(InMemoryInstanceRegistry::new());
    for descriptor in inventory.instances {
        registry.insert(descriptor);
    }
    let accounts = Arc::new(StaticAccountDirectory::from(inventory.principals));
    let api = Arc::new(RecordingMonitoringApi::new());
    let (bus, mut usage_rx) = ChannelEventBus::new(config.event_channel_buffer);

    let prometheus_registry = prometheus::Registry::new();
    let metrics = Arc::new(RelayMetrics::new()?);
    metrics.register(&prometheus_registry)?;

    let processor = Arc::new(
        BatchProcessor::new(&config, registry.clone(), accounts, api.clone(), Arc::new(bus))
            .with_metrics(metrics),
    );
    let source = Arc::new(StaticSensorSource::new(batch));
    let poller = SensorPoller::new(&config, source, registry, processor);

    let report = poller.poll_once().await;

    for put in api.submissions() {
        info!(
            namespace = %put.namespace,
            metric = %put.datum.metric_name,
            unit = %put.datum.unit,
            timestamp = %put.datum.timestamp,
            value = put.datum.value,
            principal = %put.principal_id,
            "Submitted metric point"
        );
    }
    while let Ok(event) = usage_rx.try_recv() {
        info!(
            resource = %event.resource_uuid,
            metric = %event.metric_name,
            dimension = %event.dimension_name,
            sequence = event.sequence_index,
            value = event.value,
            "Usage event"
        );
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

//! Configuration for a relay run.
//!
//! The configuration is read once from a single TOML file at process entry,
//! validated, and passed by reference into the rest of the crate. Nothing
//! else looks up configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::RelayError;

/// How long to wait for broker acknowledgment before treating the publish as
/// failed. Bounds the delivery future so a hung transport cannot stall the
/// cycle indefinitely.
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(30);

/// Validated configuration snapshot.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub measurement: MeasurementConfig,
    /// Identity injected into decoded results. Doubles as the partition key,
    /// so it is available even when publishing is disabled.
    pub producer_identity: Option<String>,
    /// Present only when publishing is enabled.
    pub kafka: Option<KafkaSettings>,
    /// Backup spool path, present only when the backup branch is enabled.
    pub backup: Option<PathBuf>,
}

/// The external measurement command to invoke.
#[derive(Debug, Clone, Deserialize)]
pub struct MeasurementConfig {
    pub command: String,
    #[serde(default = "default_measurement_args")]
    pub args: Vec<String>,
}

fn default_measurement_args() -> Vec<String> {
    vec!["--json".to_string(), "--secure".to_string()]
}

/// Broker settings. All fields are required once `[kafka] enabled = true`.
#[derive(Debug, Clone)]
pub struct KafkaSettings {
    pub bootstrap_brokers: String,
    pub client_id: String,
    pub topic: String,
    pub key: String,
    /// Spillover spool for results the broker did not accept. A separate
    /// reconciliation job drains this file and retries.
    pub failure_file_path: PathBuf,
    pub publish_timeout: Duration,
}

// Raw file shape. Sections may be absent or partial; validation turns this
// into a RelayConfig or rejects it.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    measurement: Option<FileMeasurement>,
    #[serde(default)]
    kafka: FileKafka,
    #[serde(default)]
    backup: FileBackup,
}

#[derive(Debug, Deserialize)]
struct FileMeasurement {
    command: Option<String>,
    args: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct FileKafka {
    #[serde(default)]
    enabled: bool,
    bootstrap_brokers: Option<String>,
    client_id: Option<String>,
    topic: Option<String>,
    key: Option<String>,
    failure_file_path: Option<PathBuf>,
    publish_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct FileBackup {
    #[serde(default)]
    enabled: bool,
    file_path: Option<PathBuf>,
}

impl RelayConfig {
    /// Read and validate the configuration file at `path`.
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Parse and validate configuration from TOML text.
    ///
    /// Fields belonging to a disabled branch may be absent; fields of an
    /// enabled branch are required and missing ones fail here, before any
    /// cycle runs.
    pub fn from_toml(text: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(text).context("failed to parse config file")?;

        let measurement = {
            let section = file.measurement.ok_or(missing("measurement", "command"))?;
            MeasurementConfig {
                command: section.command.ok_or(missing("measurement", "command"))?,
                args: section.args.unwrap_or_else(default_measurement_args),
            }
        };

        let producer_identity = file.kafka.key.clone();

        let kafka = if file.kafka.enabled {
            let k = file.kafka;
            Some(KafkaSettings {
                bootstrap_brokers: k
                    .bootstrap_brokers
                    .ok_or(missing("kafka", "bootstrap_brokers"))?,
                client_id: k.client_id.ok_or(missing("kafka", "client_id"))?,
                topic: k.topic.ok_or(missing("kafka", "topic"))?,
                key: k.key.ok_or(missing("kafka", "key"))?,
                failure_file_path: k
                    .failure_file_path
                    .ok_or(missing("kafka", "failure_file_path"))?,
                publish_timeout: k
                    .publish_timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_PUBLISH_TIMEOUT),
            })
        } else {
            None
        };

        let backup = if file.backup.enabled {
            Some(file.backup.file_path.ok_or(missing("backup", "file_path"))?)
        } else {
            None
        };

        Ok(Self {
            measurement,
            producer_identity,
            kafka,
            backup,
        })
    }
}

fn missing(section: &'static str, field: &'static str) -> RelayError {
    RelayError::ConfigMissing { section, field }
}

//! Decides, per cycle, whether a measurement result is published, spooled,
//! or both, and guarantees a result that fails to publish still lands in the
//! failure spool.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::broker::Publisher;
use crate::config::RelayConfig;
use crate::spool;

/// How a cycle's result was persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Broker accepted the message and no spool was written.
    Published,
    /// The result reached a spool file only, either via the backup branch or
    /// as spillover from a failed publish.
    Spooled,
    /// Broker accepted the message and the backup spool received an entry.
    Both,
    /// Both delivery branches disabled; nothing was persisted. A valid
    /// configuration, not an error.
    Skipped,
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeliveryOutcome::Published => "published",
            DeliveryOutcome::Spooled => "spooled",
            DeliveryOutcome::Both => "published and spooled",
            DeliveryOutcome::Skipped => "skipped",
        })
    }
}

/// What happened to one result.
#[derive(Debug)]
pub struct DeliveryReport {
    pub outcome: DeliveryOutcome,
    /// Broker failure reason, when the publish branch ran and failed.
    pub publish_failure: Option<String>,
    /// Spool files that received the payload this cycle.
    pub spooled_to: Vec<PathBuf>,
}

pub struct DeliveryCoordinator {
    publisher: Option<Arc<dyn Publisher>>,
}

impl DeliveryCoordinator {
    /// `publisher` may be `None` only when the publish branch is disabled in
    /// the configuration this coordinator is driven with.
    pub fn new(publisher: Option<Arc<dyn Publisher>>) -> Self {
        Self { publisher }
    }

    /// Apply the delivery decision for one serialized result.
    ///
    /// The publish and backup branches are independent; both may fire in one
    /// cycle. A publish failure is contained by appending the payload to the
    /// failure spool, and only a spool append that itself fails propagates
    /// as the cycle's terminal error, since at that point the data has
    /// nowhere left to go.
    pub async fn deliver(&self, payload: &str, config: &RelayConfig) -> Result<DeliveryReport> {
        let mut published = false;
        let mut publish_failure = None;
        let mut spooled_to = Vec::new();

        if let Some(kafka) = &config.kafka {
            let publisher = self.publisher.as_ref().ok_or_else(|| {
                anyhow::anyhow!("publishing is enabled but no publisher was constructed")
            })?;

            match publisher.publish(&kafka.topic, &kafka.key, payload).await {
                Ok(()) => {
                    info!(
                        "published {} bytes to '{}' as {}",
                        payload.len(),
                        kafka.topic,
                        kafka.client_id
                    );
                    published = true;
                }
                Err(e) => {
                    warn!(
                        "publish failed, spooling result to {}: {e}",
                        kafka.failure_file_path.display()
                    );
                    spool::append(&kafka.failure_file_path, payload).await?;
                    spooled_to.push(kafka.failure_file_path.clone());
                    publish_failure = Some(e.to_string());
                }
            }
        }

        if let Some(backup_path) = &config.backup {
            info!("saving result to {}", backup_path.display());
            spool::append(backup_path, payload).await?;
            spooled_to.push(backup_path.clone());
        }

        let outcome = match (published, !spooled_to.is_empty()) {
            (true, true) => DeliveryOutcome::Both,
            (true, false) => DeliveryOutcome::Published,
            (false, true) => DeliveryOutcome::Spooled,
            (false, false) => DeliveryOutcome::Skipped,
        };

        Ok(DeliveryReport {
            outcome,
            publish_failure,
            spooled_to,
        })
    }
}

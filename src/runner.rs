//! High-level cycle API: one measurement, one envelope, one delivery
//! decision, run to completion.
//!
//! This is the primary API for the CLI. Scheduling repeated cycles is left to
//! an external timer (cron, systemd); cycles are never run concurrently
//! against the same spool files.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::warn;

use crate::broker::{KafkaPublisher, Publisher};
use crate::config::RelayConfig;
use crate::delivery::DeliveryCoordinator;
use crate::envelope::build_envelope;
use crate::source::MeasurementRunner;

pub use crate::delivery::DeliveryOutcome;

/// Result of one completed measurement cycle.
#[derive(Debug)]
pub struct CycleReport {
    pub outcome: DeliveryOutcome,
    /// The text that was delivered: the augmented envelope when the
    /// measurement output decoded, the raw output otherwise.
    pub payload: String,
    /// Whether the payload carries the injected producer identity.
    pub augmented: bool,
    pub publish_failure: Option<String>,
    pub spooled_to: Vec<PathBuf>,
    pub duration: Duration,
}

/// Run one measurement cycle with the given configuration.
pub async fn run_cycle(config: &RelayConfig) -> Result<CycleReport> {
    let publisher: Option<Arc<dyn Publisher>> = match &config.kafka {
        Some(settings) => Some(Arc::new(KafkaPublisher::new(settings)?)),
        None => None,
    };

    run_cycle_with(config, publisher).await
}

/// As [`run_cycle`], with an explicit publisher. Tests use this to observe or
/// fail the broker path without a running broker.
pub(crate) async fn run_cycle_with(
    config: &RelayConfig,
    publisher: Option<Arc<dyn Publisher>>,
) -> Result<CycleReport> {
    let started = Instant::now();

    let measured = MeasurementRunner::new(&config.measurement).run().await?;

    let (payload, augmented) = match &config.producer_identity {
        Some(identity) => match build_envelope(&measured.stdout, identity) {
            Ok(envelope) => (envelope, true),
            Err(e) => {
                warn!("relaying measurement output verbatim: {e}");
                (measured.stdout, false)
            }
        },
        None => (measured.stdout, false),
    };

    let coordinator = DeliveryCoordinator::new(publisher);
    let report = coordinator.deliver(&payload, config).await?;

    Ok(CycleReport {
        outcome: report.outcome,
        payload,
        augmented,
        publish_failure: report.publish_failure,
        spooled_to: report.spooled_to,
        duration: started.elapsed(),
    })
}

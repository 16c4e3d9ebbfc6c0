//! Publisher seam over the message broker.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rdkafka::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;

use crate::config::KafkaSettings;
use crate::error::RelayError;

/// Broker publish seam.
///
/// `publish` must observe the broker acknowledgment (or a bounded timeout)
/// before returning, so a failed delivery is seen within the cycle that
/// produced the message and never dropped after the fact.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<(), RelayError>;
}

/// Kafka-backed publisher.
pub struct KafkaPublisher {
    producer: FutureProducer,
    timeout: Duration,
}

impl KafkaPublisher {
    pub fn new(settings: &KafkaSettings) -> Result<Self> {
        let producer = ClientConfig::new()
            .set("bootstrap.servers", settings.bootstrap_brokers.as_str())
            .set("client.id", settings.client_id.as_str())
            .set(
                "message.timeout.ms",
                settings.publish_timeout.as_millis().to_string(),
            )
            .create()
            .context("failed to create Kafka producer")?;

        Ok(Self {
            producer,
            timeout: settings.publish_timeout,
        })
    }
}

#[async_trait]
impl Publisher for KafkaPublisher {
    async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<(), RelayError> {
        let record = FutureRecord::to(topic).key(key).payload(payload);

        // Awaiting the delivery future is the explicit flush point: it
        // resolves only once the broker has acknowledged the message or the
        // enqueue/delivery failed.
        match self.producer.send(record, Timeout::After(self.timeout)).await {
            Ok(_) => Ok(()),
            Err((err, _message)) => Err(RelayError::Publish {
                topic: topic.to_string(),
                reason: err.to_string(),
            }),
        }
    }
}

//! Domain event fan-out: audit log plus optional NATS publication.

use tracing::{info, warn};

use crate::domain::events::DomainEvent;

#[derive(Clone, Default)]
pub struct EventPublisher { nats: Option<async_nats::Client> }

impl EventPublisher {
    pub fn new(nats: Option<async_nats::Client>) -> Self { Self { nats } }

    /// Logs only, publishes nowhere.
    pub fn log_only() -> Self { Self::default() }

    /// Never fails the calling operation; delivery problems are logged.
    pub async fn publish(&self, events: Vec<DomainEvent>) {
        for event in events {
            let payload = match serde_json::to_vec(&event) {
                Ok(p) => p,
                Err(e) => { warn!(subject = event.subject(), error = %e, "failed to encode domain event"); continue; }
            };
            info!(target: "audit", subject = event.subject(), id = event.subject_id(), event = %String::from_utf8_lossy(&payload), "domain event");
            if let Some(client) = &self.nats {
                if let Err(e) = client.publish(event.subject().to_string(), payload.into()).await {
                    warn!(subject = event.subject(), error = %e, "failed to publish domain event");
                }
            }
        }
    }
}

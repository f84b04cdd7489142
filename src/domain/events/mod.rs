//! Domain events
use serde::Serialize;

#[derive(Clone, Debug)]
pub enum DomainEvent {
    Supplier(SupplierEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SupplierEvent {
    Created { supplier_id: String, name: String },
    Updated { supplier_id: String, tier_count: usize },
    Deleted { supplier_id: String },
}

impl DomainEvent {
    /// NATS subject the event is published on.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Supplier(SupplierEvent::Created { .. }) => "supplier.created",
            Self::Supplier(SupplierEvent::Updated { .. }) => "supplier.updated",
            Self::Supplier(SupplierEvent::Deleted { .. }) => "supplier.deleted",
        }
    }

    pub fn payload(&self) -> serde_json::Result<Vec<u8>> {
        match self { Self::Supplier(e) => serde_json::to_vec(e) }
    }
}

/// Fire-and-forget publisher; failures are logged, never returned.
#[derive(Clone)]
pub struct EventPublisher {
    client: async_nats::Client,
}

impl EventPublisher {
    pub fn new(client: async_nats::Client) -> Self { Self { client } }

    pub async fn publish(&self, events: Vec<DomainEvent>) {
        for event in events {
            let payload = match event.payload() {
                Ok(p) => p,
                Err(e) => { tracing::warn!(subject = event.subject(), error = %e, "event encoding failed"); continue; }
            };
            if let Err(e) = self.client.publish(event.subject().to_string(), payload.into()).await {
                tracing::warn!(subject = event.subject(), error = %e, "event publish failed");
            }
        }
    }
}

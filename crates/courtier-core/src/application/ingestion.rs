//! Provider-event ingestion
//!
//! Each accepted event appends exactly one interaction. Unknown recipients
//! keep a null contact reference. No deduplication and no ordering across
//! concurrent deliveries.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::aggregates::Interaction;
use crate::domain::events::ProviderEvent;
use crate::ports::inbound::{EventIngestion, IngestError, IngestOutcome};
use crate::ports::outbound::DataStore;

pub struct InteractionIngestor {
    store: Arc<dyn DataStore>,
}

impl InteractionIngestor {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Dispatch one decoded event
    pub async fn handle(&self, event: &ProviderEvent) -> Result<IngestOutcome, IngestError> {
        let Some(kind) = event.kind() else {
            tracing::info!(event = %event.event, email = %event.email, "Unhandled provider event");
            return Ok(IngestOutcome::Ignored { event: event.event.clone() });
        };
        let occurred_at = event.occurred_at().ok_or(IngestError::Timestamp(event.ts))?;

        tracing::info!(
            event = %kind,
            email = %event.email,
            message_id = event.message_id.as_deref().unwrap_or("-"),
            campaign = event.campaign_tag().unwrap_or("-"),
            "Provider event received"
        );

        let contact_id = match self.store.find_contact_by_email(&event.email).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(email = %event.email, error = %e, "Contact lookup failed, recording without contact");
                None
            }
        };

        let interaction = Interaction::from_provider_event(kind, event, contact_id, occurred_at);
        if let Err(e) = self.store.insert_interaction(&interaction).await {
            tracing::error!(event = %kind, email = %event.email, error = %e, "Interaction insert failed");
            return Ok(IngestOutcome::InsertFailed { kind, error: e });
        }

        Ok(IngestOutcome::Recorded { kind, contact_id })
    }
}

#[async_trait]
impl EventIngestion for InteractionIngestor {
    async fn ingest(&self, body: &[u8]) -> Result<IngestOutcome, IngestError> {
        let event: ProviderEvent = serde_json::from_slice(body)?;
        self.handle(&event).await
    }
}

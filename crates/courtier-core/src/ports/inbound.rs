//! Inbound ports (use case traits)

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::events::ProviderEventKind;
use crate::domain::value_objects::ContactId;
use crate::ports::outbound::StoreError;

/// Provider-event ingestion use case
#[async_trait]
pub trait EventIngestion: Send + Sync {
    /// Handle one raw webhook body
    async fn ingest(&self, body: &[u8]) -> Result<IngestOutcome, IngestError>;
}

/// What happened to an accepted event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// One interaction appended
    Recorded {
        kind: ProviderEventKind,
        contact_id: Option<ContactId>,
    },
    /// Unrecognized event type; nothing written
    Ignored { event: String },
    /// The interaction insert failed after the event was understood
    InsertFailed {
        kind: ProviderEventKind,
        error: StoreError,
    },
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("event timestamp out of range: {0}")]
    Timestamp(f64),
}

//! Interaction records
//!
//! Append-only log of contact-touching events. Rows are never updated or
//! deleted here; history order is the provider timestamp, not insertion order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::events::{ProviderEvent, ProviderEventKind};
use crate::domain::value_objects::ContactId;

/// Row written to the `interactions` table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub contact_id: Option<ContactId>,
    #[serde(rename = "type")]
    pub kind: InteractionType,
    #[serde(rename = "canal")]
    pub channel: InteractionChannel,
    #[serde(rename = "sujet")]
    pub subject: String,
    pub message: String,
    #[serde(rename = "statut")]
    pub status: InteractionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionType {
    #[serde(rename = "envoi")]
    Sent,
    #[serde(rename = "ouverture")]
    Opened,
    #[serde(rename = "clic")]
    Clicked,
    #[serde(rename = "bounce")]
    Bounced,
    #[serde(rename = "desabonnement")]
    Unsubscribed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionChannel {
    Email,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionStatus {
    Success,
    Error,
    Info,
}

impl Interaction {
    /// Normalize one provider event
    pub fn from_provider_event(
        kind: ProviderEventKind,
        event: &ProviderEvent,
        contact_id: Option<ContactId>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        let subject = |fallback: &str| {
            event
                .subject
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };

        let (kind, subject, message, status) = match kind {
            ProviderEventKind::Delivered => (
                InteractionType::Sent,
                subject("Email envoyé"),
                "Email délivré avec succès".to_string(),
                InteractionStatus::Success,
            ),
            ProviderEventKind::Opened => (
                InteractionType::Opened,
                subject("Email ouvert"),
                "Email ouvert".to_string(),
                InteractionStatus::Success,
            ),
            ProviderEventKind::Clicked => (
                InteractionType::Clicked,
                subject("Lien cliqué"),
                match event.link.as_deref() {
                    Some(link) => format!("Lien cliqué: {link}"),
                    None => "Lien cliqué".to_string(),
                },
                InteractionStatus::Success,
            ),
            ProviderEventKind::Bounced => (
                InteractionType::Bounced,
                subject("Email bounce"),
                match event.reason.as_deref() {
                    Some(reason) => format!("Email bounce: {reason}"),
                    None => "Email bounce".to_string(),
                },
                InteractionStatus::Error,
            ),
            ProviderEventKind::Unsubscribed => (
                InteractionType::Unsubscribed,
                "Désabonnement".to_string(),
                "Contact désabonné".to_string(),
                InteractionStatus::Info,
            ),
        };

        Self {
            contact_id,
            kind,
            channel: InteractionChannel::Email,
            subject,
            message,
            status,
            created_at: occurred_at,
        }
    }
}

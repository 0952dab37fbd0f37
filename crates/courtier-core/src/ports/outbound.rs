//! Outbound ports
//!
//! Capabilities the core needs from the outside world. Both are injected
//! into the wizard and the ingestor so tests can substitute doubles.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::aggregates::{Interaction, NewContact, NewProject};
use crate::domain::events::TrackingEvent;
use crate::domain::value_objects::{ConsentRecord, ContactId, ProjectId};

/// Hosted relational store holding contacts, projects, consents and interactions
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Insert a contact, returning its generated identifier
    async fn create_contact(&self, contact: &NewContact) -> Result<ContactId, StoreError>;

    /// Exact-match lookup on the contact email.
    /// More than one match is `StoreError::Ambiguous`.
    async fn find_contact_by_email(&self, email: &str) -> Result<Option<ContactId>, StoreError>;

    /// Insert consent rows
    async fn record_consents(&self, consents: &[ConsentRecord]) -> Result<(), StoreError>;

    /// Insert a project, returning its generated identifier
    async fn create_project(&self, project: &NewProject) -> Result<ProjectId, StoreError>;

    /// Append one interaction
    async fn insert_interaction(&self, interaction: &Interaction) -> Result<(), StoreError>;
}

/// Analytics collector
#[async_trait]
pub trait TrackingSink: Send + Sync {
    async fn track(&self, event: &TrackingEvent) -> Result<(), TrackingError>;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("write rejected: {0}")]
    Rejected(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("request timed out")]
    Timeout,

    #[error("ambiguous match: {0}")]
    Ambiguous(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("tracking failed: {0}")]
pub struct TrackingError(pub String);

//! Courtier lead-capture core
//!
//! Lead capture and provider-event ingestion for the Courtier insurance
//! brokerage CRM, organised the hexagonal way.
//!
//! ## Architecture
//!
//! - **Domain Layer**: form definitions, field/step validation, wizard state,
//!   consents, submissions, interactions
//! - **Application Layer**: wizard controller, submission pipeline,
//!   interaction ingestor
//! - **Ports Layer**: `DataStore` and `TrackingSink` capabilities, ingestion use case
//! - **Infrastructure Layer**: in-memory store, tracing sink, PostgREST store
//!
//! ## Flows
//!
//! ```text
//!  landing page ──► Wizard ──► SubmissionPipeline ──► DataStore (contact → consents → projet)
//!                     │                 │
//!                     └──────► TrackingSink ◄┘
//!
//!  email provider ──► InteractionIngestor ──► DataStore (contact lookup → interaction)
//! ```

pub mod domain;
pub mod application;
pub mod ports;
pub mod infrastructure;

// Re-exports for convenience
pub use domain::aggregates::{
    health_quote_form, ChoiceInput, FieldKind, FormDefinition, FormField, FormState, FormStep,
    Interaction, InteractionStatus, InteractionType, LeadDefaults, NewContact, NewProject,
    Submission, SubmissionStatus, TextInput, ValidationRule, DEFAULT_FORM_ID,
};
pub use domain::events::{ProviderEvent, ProviderEventKind, TrackingEvent};
pub use domain::services::{
    first_invalid_step, validate_field, validate_step, FieldError, StepValidation,
};
pub use domain::value_objects::{
    AttributionParams, ConsentFlags, ConsentOption, ConsentRecord, ContactId, ErrorMap,
    FieldValue, FieldValues, PrefillClaims, ProjectId,
};
pub use domain::DefinitionError;
pub use application::{
    InteractionIngestor, NextOutcome, SubmissionError, SubmissionPipeline, Wizard, WizardContext,
    WizardError,
};
pub use ports::inbound::{EventIngestion, IngestError, IngestOutcome};
pub use ports::outbound::{DataStore, StoreError, TrackingError, TrackingSink};

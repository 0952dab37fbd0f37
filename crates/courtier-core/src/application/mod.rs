//! Application layer
//!
//! Use cases orchestrating the domain through the outbound ports.

pub mod ingestion;
pub mod pipeline;
pub mod wizard;

pub use ingestion::InteractionIngestor;
pub use pipeline::{SubmissionError, SubmissionPipeline};
pub use wizard::{NextOutcome, Wizard, WizardContext, WizardError};

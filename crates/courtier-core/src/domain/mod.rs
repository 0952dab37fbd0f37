//! Domain module
//!
//! Form definitions, validation rules and the records produced by lead
//! capture and provider-event ingestion.

pub mod aggregates;
pub mod value_objects;
pub mod events;
pub mod services;

pub use aggregates::*;
pub use value_objects::*;
pub use events::*;

use thiserror::Error;

/// Error raised while loading a form definition
#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("form definition has no steps")]
    NoSteps,

    #[error("step {0} has no fields")]
    EmptyStep(String),

    #[error("duplicate field id: {0}")]
    DuplicateField(String),

    #[error("choice field {0} has no options")]
    MissingOptions(String),

    #[error("invalid pattern for field {field}: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("malformed form definition: {0}")]
    Parse(#[from] serde_json::Error),
}

//! Aggregates and entities

pub mod form;
pub mod form_state;
pub mod health_quote;
pub mod interaction;
pub mod submission;

pub use form::{ChoiceInput, FieldKind, FormDefinition, FormField, FormStep, Pattern, TextInput, ValidationRule};
pub use form_state::FormState;
pub use health_quote::{health_quote_form, DEFAULT_FORM_ID};
pub use interaction::{Interaction, InteractionChannel, InteractionStatus, InteractionType};
pub use submission::{LeadDefaults, NewContact, NewProject, Submission, SubmissionStatus};

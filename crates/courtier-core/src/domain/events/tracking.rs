//! Analytics events emitted by the wizard

use serde::Serialize;

use crate::domain::value_objects::{AttributionParams, ContactId, FieldValues, ProjectId};

/// Fire-and-forget tracking event
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TrackingEvent {
    FormStarted {
        form_id: String,
        page_slug: Option<String>,
        utm: AttributionParams,
    },
    StepCompleted {
        form_id: String,
        /// 1-based
        step: usize,
        step_title: String,
        payload: FieldValues,
    },
    FormSubmitted {
        form_id: String,
        contact_id: ContactId,
        project_id: ProjectId,
        utm: AttributionParams,
    },
    ConsentGranted {
        form_id: String,
        contact_id: ContactId,
        purposes: Vec<String>,
    },
}

impl TrackingEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FormStarted { .. } => "form_started",
            Self::StepCompleted { .. } => "step_completed",
            Self::FormSubmitted { .. } => "form_submitted",
            Self::ConsentGranted { .. } => "consent_granted",
        }
    }

    pub fn form_id(&self) -> &str {
        match self {
            Self::FormStarted { form_id, .. }
            | Self::StepCompleted { form_id, .. }
            | Self::FormSubmitted { form_id, .. }
            | Self::ConsentGranted { form_id, .. } => form_id,
        }
    }
}

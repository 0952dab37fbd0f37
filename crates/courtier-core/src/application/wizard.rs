//! Wizard controller
//!
//! One instance per visitor session. Step transitions are synchronous;
//! the only suspension point is the submission pipeline, during which the
//! submitting flag is raised on a watch channel.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

use crate::domain::aggregates::{FormDefinition, FormState, Submission};
use crate::domain::events::TrackingEvent;
use crate::domain::services::{first_invalid_step, validate_step};
use crate::domain::value_objects::{
    AttributionParams, ConsentFlags, ConsentOption, ErrorMap, FieldValue, FieldValues,
    PrefillClaims,
};

use super::pipeline::{SubmissionError, SubmissionPipeline};

/// Session inputs captured when the wizard mounts
#[derive(Debug, Clone, Default)]
pub struct WizardContext {
    pub page_slug: Option<String>,
    pub attribution: AttributionParams,
    pub prefill: Option<PrefillClaims>,
    pub user_agent: Option<String>,
    pub initial_values: FieldValues,
}

impl WizardContext {
    pub fn with_page_slug(mut self, slug: impl Into<String>) -> Self {
        self.page_slug = Some(slug.into());
        self
    }

    pub fn with_attribution(mut self, attribution: AttributionParams) -> Self {
        self.attribution = attribution;
        self
    }

    pub fn with_prefill(mut self, claims: PrefillClaims) -> Self {
        self.prefill = Some(claims);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_initial_values(mut self, values: FieldValues) -> Self {
        self.initial_values = values;
        self
    }
}

/// Result of `Wizard::next`
#[derive(Debug, Clone)]
pub enum NextOutcome {
    /// Stayed on (or moved back to) `step` with inline errors
    Invalid { step: usize, errors: ErrorMap },
    Advanced { step: usize },
    Submitted(Submission),
    /// Wizard remains on the last step; resubmission is allowed
    SubmissionFailed {
        message: &'static str,
        error: SubmissionError,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("unknown field: {0}")]
    UnknownField(String),
}

pub struct Wizard {
    definition: Arc<FormDefinition>,
    context: WizardContext,
    state: FormState,
    pipeline: SubmissionPipeline,
    submitting: watch::Sender<bool>,
}

impl Wizard {
    /// Mount the wizard: merge prefill claims and emit `form_started`.
    /// Call once per session.
    pub async fn initialize(
        definition: Arc<FormDefinition>,
        context: WizardContext,
        pipeline: SubmissionPipeline,
    ) -> Self {
        let mut state = FormState::new(context.initial_values.clone());
        if let Some(claims) = &context.prefill {
            state.merge_prefill(claims);
        }

        let (submitting, _) = watch::channel(false);
        let wizard = Self { definition, context, state, pipeline, submitting };

        tracing::debug!(form_id = wizard.definition.id(), "Wizard initialized");
        wizard
            .pipeline
            .track(TrackingEvent::FormStarted {
                form_id: wizard.definition.id().to_string(),
                page_slug: wizard.context.page_slug.clone(),
                utm: wizard.context.attribution.clone(),
            })
            .await;

        wizard
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    pub fn context(&self) -> &WizardContext {
        &self.context
    }

    pub fn current_step(&self) -> usize {
        self.state.current_step()
    }

    /// Observe the submitting flag
    pub fn submitting(&self) -> watch::Receiver<bool> {
        self.submitting.subscribe()
    }

    /// Set a value and clear that field's error only
    pub fn edit_field(
        &mut self,
        field_id: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), WizardError> {
        if self.definition.field(field_id).is_none() {
            return Err(WizardError::UnknownField(field_id.to_string()));
        }
        self.state.set_value(field_id, value.into());
        self.state.clear_error(field_id);
        Ok(())
    }

    pub fn set_consent(&mut self, option: ConsentOption, granted: bool) {
        self.state.consents_mut().set(option, granted);
    }

    pub fn set_consents(&mut self, flags: ConsentFlags) {
        *self.state.consents_mut() = flags;
    }

    /// Unconditional back navigation, floored at step 0
    pub fn prev(&mut self) -> usize {
        let step = self.state.current_step().saturating_sub(1);
        self.state.go_to(step);
        step
    }

    pub async fn next(&mut self) -> NextOutcome {
        let definition = Arc::clone(&self.definition);
        let index = self.state.current_step();
        let step = &definition.steps()[index];

        let validation = validate_step(step, self.state.values());
        self.state.replace_errors(validation.errors.clone());
        if !validation.is_valid() {
            tracing::debug!(form_id = definition.id(), step = index, errors = validation.errors.len(), "Step invalid");
            return NextOutcome::Invalid { step: index, errors: validation.errors };
        }

        if index < definition.last_step_index() {
            self.track_step_completed(index).await;
            self.state.go_to(index + 1);
            return NextOutcome::Advanced { step: index + 1 };
        }

        self.submit().await
    }

    async fn submit(&mut self) -> NextOutcome {
        let definition = Arc::clone(&self.definition);

        // Earlier steps may have been edited after they were passed
        if let Some((index, validation)) = first_invalid_step(&definition, self.state.values()) {
            return self.send_back(index, validation.errors);
        }
        self.track_step_completed(definition.last_step_index()).await;

        self.set_submitting(true);
        let result = self.pipeline.run(&definition, &self.context, &self.state).await;
        self.set_submitting(false);

        match result {
            Ok(submission) => NextOutcome::Submitted(submission),
            Err(SubmissionError::Invalid { step, errors }) => self.send_back(step, errors),
            Err(error) => NextOutcome::SubmissionFailed { message: error.user_message(), error },
        }
    }

    fn send_back(&mut self, step: usize, errors: ErrorMap) -> NextOutcome {
        tracing::debug!(form_id = self.definition.id(), step, errors = errors.len(), "Returning to invalid step");
        self.state.go_to(step);
        self.state.replace_errors(errors.clone());
        NextOutcome::Invalid { step, errors }
    }

    async fn track_step_completed(&self, index: usize) {
        let Some(step) = self.definition.step(index) else {
            return;
        };
        self.pipeline
            .track(TrackingEvent::StepCompleted {
                form_id: self.definition.id().to_string(),
                step: index + 1,
                step_title: step.title.clone(),
                payload: self.state.values().clone(),
            })
            .await;
    }

    fn set_submitting(&mut self, submitting: bool) {
        self.state.set_submitting(submitting);
        self.submitting.send_replace(submitting);
    }
}

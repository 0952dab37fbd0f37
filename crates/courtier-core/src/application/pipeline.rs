//! Submission pipeline
//!
//! Ordered writes performed once a wizard completes:
//! contact, then consents (best-effort), then project, then tracking.
//! The whole form is validated before the first write. There is no
//! transaction spanning the writes.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::aggregates::{
    FormDefinition, FormState, LeadDefaults, NewContact, NewProject, Submission, SubmissionStatus,
};
use crate::domain::events::TrackingEvent;
use crate::domain::services::first_invalid_step;
use crate::domain::value_objects::{ContactId, ErrorMap};
use crate::ports::outbound::{DataStore, StoreError, TrackingSink};

use super::wizard::WizardContext;

/// Message shown to the visitor for any write failure
pub const GENERIC_FAILURE_MESSAGE: &str = "Une erreur est survenue. Veuillez réessayer.";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// Nothing was written
    #[error("step {step} has {} invalid field(s)", .errors.len())]
    Invalid { step: usize, errors: ErrorMap },

    #[error("contact creation failed: {0}")]
    ContactCreation(#[source] StoreError),

    /// The contact row exists without a project
    #[error("project creation failed for contact {contact_id}: {source}")]
    ProjectCreation {
        contact_id: ContactId,
        #[source]
        source: StoreError,
    },
}

impl SubmissionError {
    pub fn user_message(&self) -> &'static str {
        GENERIC_FAILURE_MESSAGE
    }

    /// Contact left behind by a failed submission
    pub fn orphaned_contact(&self) -> Option<ContactId> {
        match self {
            Self::Invalid { .. } | Self::ContactCreation(_) => None,
            Self::ProjectCreation { contact_id, .. } => Some(*contact_id),
        }
    }
}

/// Writes a completed form to the store and reports it to the tracker
#[derive(Clone)]
pub struct SubmissionPipeline {
    store: Arc<dyn DataStore>,
    tracker: Arc<dyn TrackingSink>,
    defaults: LeadDefaults,
    timeout: Duration,
}

impl SubmissionPipeline {
    pub fn new(store: Arc<dyn DataStore>, tracker: Arc<dyn TrackingSink>) -> Self {
        Self {
            store,
            tracker,
            defaults: LeadDefaults::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_defaults(mut self, defaults: LeadDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Upper bound on each individual store call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn defaults(&self) -> &LeadDefaults {
        &self.defaults
    }

    /// Report an event; failures are logged and swallowed
    pub(crate) async fn track(&self, event: TrackingEvent) {
        if let Err(e) = self.tracker.track(&event).await {
            tracing::warn!(event = event.name(), error = %e, "Tracking failed");
        }
    }

    pub async fn run(
        &self,
        definition: &FormDefinition,
        context: &WizardContext,
        state: &FormState,
    ) -> Result<Submission, SubmissionError> {
        let form_id = definition.id();
        if let Some((step, validation)) = first_invalid_step(definition, state.values()) {
            tracing::warn!(form_id, step, errors = validation.errors.len(), "Refusing invalid submission");
            return Err(SubmissionError::Invalid { step, errors: validation.errors });
        }

        let now = Utc::now();
        let contact = NewContact::from_values(state.values(), &self.defaults);

        let contact_id = self
            .bounded(self.store.create_contact(&contact))
            .await
            .map_err(|e| {
                tracing::error!(form_id, error = %e, "Contact creation failed");
                SubmissionError::ContactCreation(e)
            })?;
        tracing::debug!(form_id, contact_id = %contact_id, "Contact created");

        let consents = state
            .consents()
            .records(contact_id, context.user_agent.as_deref(), now);
        if !consents.is_empty() {
            if let Err(e) = self.bounded(self.store.record_consents(&consents)).await {
                tracing::warn!(
                    contact_id = %contact_id,
                    count = consents.len(),
                    error = %e,
                    "Consent recording failed, continuing"
                );
            }
        }

        let project = NewProject::for_contact(
            contact_id,
            &context.attribution,
            context.page_slug.as_deref(),
            &self.defaults,
            now,
        );
        let project_id = self
            .bounded(self.store.create_project(&project))
            .await
            .map_err(|e| {
                tracing::error!(
                    form_id,
                    contact_id = %contact_id,
                    error = %e,
                    "Project creation failed, contact left without project"
                );
                SubmissionError::ProjectCreation { contact_id, source: e }
            })?;

        tracing::info!(
            form_id,
            contact_id = %contact_id,
            project_id = %project_id,
            "Lead submitted"
        );

        self.track(TrackingEvent::FormSubmitted {
            form_id: form_id.to_string(),
            contact_id,
            project_id,
            utm: context.attribution.clone(),
        })
        .await;

        // Emitted even when no purpose was granted
        self.track(TrackingEvent::ConsentGranted {
            form_id: form_id.to_string(),
            contact_id,
            purposes: state
                .consents()
                .granted()
                .iter()
                .map(|o| o.as_str().to_string())
                .collect(),
        })
        .await;

        Ok(Submission {
            id: Uuid::new_v4(),
            form_id: form_id.to_string(),
            contact_id: Some(contact_id),
            project_id: Some(project_id),
            payload: state.values().clone(),
            status: SubmissionStatus::Submitted,
            utm: context.attribution.clone(),
            prefill_claims: context.prefill.clone(),
            created_at: now,
        })
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{FormField, FormStep};
    use crate::domain::value_objects::{AttributionParams, ConsentOption, FieldValue, FieldValues};
    use crate::infrastructure::{InMemoryDataStore, RecordingTrackingSink, StoreCall};
    use async_trait::async_trait;

    fn definition() -> FormDefinition {
        FormDefinition::new(
            "default-form",
            None,
            vec![
                FormStep::new(
                    "identite",
                    "Vos informations",
                    vec![
                        FormField::text("prenom", "Prénom").required(),
                        FormField::text("nom", "Nom").required(),
                        FormField::email("email", "Email").required(),
                        FormField::tel("telephone", "Téléphone"),
                    ],
                ),
                FormStep::new(
                    "situation",
                    "Votre situation",
                    vec![FormField::text("code_postal", "Code postal").required()],
                ),
            ],
        )
        .unwrap()
    }

    fn values() -> FieldValues {
        [
            ("prenom", "Jeanne"),
            ("nom", "Martin"),
            ("email", "jeanne@exemple.fr"),
            ("telephone", "06 12 34 56 78"),
            ("code_postal", "75011"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), FieldValue::from(v)))
        .collect()
    }

    fn context() -> WizardContext {
        WizardContext::default()
            .with_page_slug("mutuelle-senior")
            .with_attribution(
                AttributionParams::default()
                    .with("utm_source", "google")
                    .with("utm_campaign", "printemps"),
            )
    }

    fn pipeline(store: &Arc<InMemoryDataStore>, tracker: &Arc<RecordingTrackingSink>) -> SubmissionPipeline {
        SubmissionPipeline::new(store.clone(), tracker.clone())
    }

    #[tokio::test]
    async fn test_writes_in_order() {
        let store = Arc::new(InMemoryDataStore::new());
        let tracker = Arc::new(RecordingTrackingSink::new());
        let mut state = FormState::new(values());
        state.consents_mut().set(ConsentOption::Marketing, true);

        let submission = pipeline(&store, &tracker).run(&definition(), &context(), &state).await.unwrap();

        assert_eq!(
            store.calls(),
            vec![StoreCall::CreateContact, StoreCall::RecordConsents, StoreCall::CreateProject]
        );
        let (contact_id, contact) = &store.contacts()[0];
        assert_eq!(contact.civilite, "M.");
        assert_eq!(contact.email.as_deref(), Some("jeanne@exemple.fr"));

        let (project_id, project) = &store.projects()[0];
        assert_eq!(project.contact_id, *contact_id);
        assert_eq!(project.origine, "google");
        assert_eq!(project.provenance, "mutuelle-senior");
        assert_eq!(project.attribution, "printemps");
        assert_eq!(project.statut, "nouveau");

        assert_eq!(submission.contact_id, Some(*contact_id));
        assert_eq!(submission.project_id, Some(*project_id));
        assert_eq!(submission.status, SubmissionStatus::Submitted);
        assert_eq!(tracker.names(), vec!["form_submitted", "consent_granted"]);
    }

    #[tokio::test]
    async fn test_no_consent_rows_without_opt_in() {
        let store = Arc::new(InMemoryDataStore::new());
        let tracker = Arc::new(RecordingTrackingSink::new());
        let mut state = FormState::new(values());
        state.consents_mut().set(ConsentOption::Email, false);

        pipeline(&store, &tracker).run(&definition(), &context(), &state).await.unwrap();

        assert_eq!(store.call_count(StoreCall::RecordConsents), 0);
        assert_eq!(tracker.names(), vec!["form_submitted", "consent_granted"]);
        match &tracker.events()[1] {
            TrackingEvent::ConsentGranted { purposes, .. } => assert!(purposes.is_empty()),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_state_writes_nothing() {
        let store = Arc::new(InMemoryDataStore::new());
        let tracker = Arc::new(RecordingTrackingSink::new());
        let mut partial = values();
        partial.remove("code_postal");

        let err = pipeline(&store, &tracker)
            .run(&definition(), &context(), &FormState::new(FieldValues::new()))
            .await
            .unwrap_err();
        match &err {
            SubmissionError::Invalid { step, errors } => {
                assert_eq!(*step, 0);
                assert_eq!(errors["prenom"], "Prénom est requis");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.orphaned_contact(), None);

        let err = pipeline(&store, &tracker)
            .run(&definition(), &context(), &FormState::new(partial))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::Invalid { step: 1, .. }));

        assert!(store.calls().is_empty());
        assert!(tracker.events().is_empty());
    }

    #[tokio::test]
    async fn test_contact_failure_stops_everything() {
        let store = Arc::new(InMemoryDataStore::new());
        store.fail_contact_creation("violates check constraint");
        let tracker = Arc::new(RecordingTrackingSink::new());

        let err = pipeline(&store, &tracker)
            .run(&definition(), &context(), &FormState::new(values()))
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::ContactCreation(_)));
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(store.call_count(StoreCall::CreateProject), 0);
        assert!(tracker.events().is_empty());
    }

    #[tokio::test]
    async fn test_consent_failure_is_not_fatal() {
        let store = Arc::new(InMemoryDataStore::new());
        store.fail_consents("consents table missing");
        let tracker = Arc::new(RecordingTrackingSink::new());
        let mut state = FormState::new(values());
        state.consents_mut().set(ConsentOption::Partners, true);

        let submission = pipeline(&store, &tracker).run(&definition(), &context(), &state).await;

        assert!(submission.is_ok());
        assert_eq!(store.projects().len(), 1);
    }

    #[tokio::test]
    async fn test_project_failure_reports_orphan() {
        let store = Arc::new(InMemoryDataStore::new());
        store.fail_project_creation("foreign key violation");
        let tracker = Arc::new(RecordingTrackingSink::new());

        let err = pipeline(&store, &tracker)
            .run(&definition(), &context(), &FormState::new(values()))
            .await
            .unwrap_err();

        let orphan = err.orphaned_contact().unwrap();
        assert_eq!(store.contacts()[0].0, orphan);
        assert!(tracker.events().is_empty());
    }

    #[tokio::test]
    async fn test_tracking_failure_is_swallowed() {
        let store = Arc::new(InMemoryDataStore::new());
        let tracker = Arc::new(RecordingTrackingSink::failing());

        let result = pipeline(&store, &tracker).run(&definition(), &context(), &FormState::new(values())).await;

        assert!(result.is_ok());
        assert_eq!(tracker.names(), vec!["form_submitted", "consent_granted"]);
    }

    struct StalledStore;

    #[async_trait]
    impl DataStore for StalledStore {
        async fn create_contact(&self, _: &NewContact) -> Result<ContactId, StoreError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(ContactId::new(1))
        }
        async fn find_contact_by_email(&self, _: &str) -> Result<Option<ContactId>, StoreError> {
            Ok(None)
        }
        async fn record_consents(&self, _: &[crate::domain::value_objects::ConsentRecord]) -> Result<(), StoreError> {
            Ok(())
        }
        async fn create_project(&self, _: &NewProject) -> Result<crate::domain::value_objects::ProjectId, StoreError> {
            Ok(crate::domain::value_objects::ProjectId::new(1))
        }
        async fn insert_interaction(&self, _: &crate::domain::aggregates::Interaction) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_store_call_times_out() {
        let pipeline = SubmissionPipeline::new(Arc::new(StalledStore), Arc::new(RecordingTrackingSink::new()))
            .with_timeout(Duration::from_millis(20));

        let err = pipeline
            .run(&definition(), &context(), &FormState::new(values()))
            .await
            .unwrap_err();

        assert_eq!(err, SubmissionError::ContactCreation(StoreError::Timeout));
    }
}

//! Lead-capture form endpoints
//!
//! A submission replays the landing-page wizard server-side: the posted
//! values go through the same step validation and submission pipeline.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use courtier_core::{
    AttributionParams, FormDefinition, NextOutcome, Submission, Wizard, WizardContext,
};

use crate::error::ApiError;
use crate::models::{ApiResponse, ErrorResponse, SubmissionBody};
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/:form_id", get(get_form))
        .route("/:form_id/submissions", post(submit_form))
}

/// Get a form definition
#[utoipa::path(
    get,
    path = "/api/v1/forms/{form_id}",
    params(("form_id" = String, Path, description = "Form identifier")),
    responses(
        (status = 200, description = "Form definition"),
        (status = 404, description = "Form not found", body = ErrorResponse)
    ),
    tag = "forms"
)]
pub async fn get_form(
    State(state): State<Arc<ApiState>>,
    Path(form_id): Path<String>,
) -> Result<Json<ApiResponse<FormDefinition>>, ApiError> {
    let definition = state
        .form(&form_id)
        .ok_or(ApiError::FormNotFound(form_id))?;
    Ok(Json(ApiResponse::success(definition.as_ref().clone())))
}

/// Submit a completed form
#[utoipa::path(
    post,
    path = "/api/v1/forms/{form_id}/submissions",
    params(("form_id" = String, Path, description = "Form identifier")),
    request_body = SubmissionBody,
    responses(
        (status = 201, description = "Lead recorded"),
        (status = 401, description = "Invalid prefill token", body = ErrorResponse),
        (status = 404, description = "Form not found", body = ErrorResponse),
        (status = 422, description = "A step failed validation", body = ErrorResponse),
        (status = 502, description = "Store write failed", body = ErrorResponse)
    ),
    tag = "forms"
)]
pub async fn submit_form(
    State(state): State<Arc<ApiState>>,
    Path(form_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<SubmissionBody>,
) -> Result<(StatusCode, Json<ApiResponse<Submission>>), ApiError> {
    let definition = state
        .form(&form_id)
        .ok_or_else(|| ApiError::FormNotFound(form_id.clone()))?;

    let mut context = WizardContext::default().with_attribution(attribution(&body));
    if let Some(slug) = body.page_slug.as_deref().filter(|s| !s.is_empty()) {
        context = context.with_page_slug(slug);
    }
    if let Some(token) = body.prefill_token.as_deref() {
        context = context.with_prefill(state.prefill.verify(token)?);
    }
    if let Some(agent) = headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()) {
        context = context.with_user_agent(agent);
    }

    let mut wizard = Wizard::initialize(definition, context, state.pipeline()).await;
    for (field_id, value) in body.values {
        wizard.edit_field(&field_id, value)?;
    }
    wizard.set_consents(body.consents);

    loop {
        match wizard.next().await {
            NextOutcome::Advanced { .. } => continue,
            NextOutcome::Invalid { step, errors } => {
                tracing::debug!(form_id = %form_id, step, "Submission failed validation");
                return Err(ApiError::Validation { step, errors });
            }
            NextOutcome::Submitted(submission) => {
                return Ok((StatusCode::CREATED, Json(ApiResponse::success(submission))));
            }
            NextOutcome::SubmissionFailed { error, .. } => return Err(error.into()),
        }
    }
}

/// Query-string attribution, overridden by explicit parameters
fn attribution(body: &SubmissionBody) -> AttributionParams {
    let mut params = body
        .query
        .as_deref()
        .map(AttributionParams::from_query)
        .unwrap_or_default();
    for (key, value) in body.utm.iter() {
        params.insert(key, value);
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefill::tests::sign;
    use crate::{build_router, PrefillVerifier};
    use axum_test::TestServer;
    use courtier_core::infrastructure::{InMemoryDataStore, RecordingTrackingSink, StoreCall};
    use serde_json::{json, Value};

    struct Harness {
        store: Arc<InMemoryDataStore>,
        tracker: Arc<RecordingTrackingSink>,
        server: TestServer,
    }

    fn harness_with(configure: impl FnOnce(ApiState) -> ApiState) -> Harness {
        let store = Arc::new(InMemoryDataStore::new());
        let tracker = Arc::new(RecordingTrackingSink::new());
        let state = configure(ApiState::new(store.clone(), tracker.clone()).unwrap());
        let server = TestServer::new(build_router(state)).unwrap();
        Harness { store, tracker, server }
    }

    fn harness() -> Harness {
        harness_with(|state| state)
    }

    fn complete_values() -> Value {
        json!({
            "prenom": "Jeanne",
            "nom": "Martin",
            "email": "jeanne@exemple.fr",
            "telephone": "06 12 34 56 78",
            "age": "46-55 ans",
            "code_postal": "75011",
            "situation": "Salarié(e)",
            "mutuelle_actuelle": "Non, aucune mutuelle",
            "garanties": ["Optique (lunettes, lentilles)", "Hospitalisation"],
            "budget": "50€ - 80€",
            "delai": "Dans le mois"
        })
    }

    #[tokio::test]
    async fn test_get_default_form() {
        let h = harness();

        let body: Value = h.server.get("/api/v1/forms/default-form").await.json();

        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["id"], "default-form");
        assert_eq!(body["data"]["steps"].as_array().unwrap().len(), 3);

        h.server
            .get("/api/v1/forms/inconnu")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_complete_submission() {
        let h = harness();

        let response = h
            .server
            .post("/api/v1/forms/default-form/submissions")
            .json(&json!({
                "values": complete_values(),
                "consents": { "marketing": true },
                "page_slug": "mutuelle-senior",
                "query": "?utm_source=google&utm_campaign=printemps&gclid=abc"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["data"]["status"], "submitted");
        assert_eq!(body["data"]["utm"]["gclid"], "abc");

        assert_eq!(
            h.store.calls(),
            vec![StoreCall::CreateContact, StoreCall::RecordConsents, StoreCall::CreateProject]
        );
        let project = &h.store.projects()[0].1;
        assert_eq!(project.origine, "google");
        assert_eq!(project.provenance, "mutuelle-senior");
        assert_eq!(project.attribution, "printemps");
        assert_eq!(
            h.tracker.names(),
            vec![
                "form_started",
                "step_completed",
                "step_completed",
                "step_completed",
                "form_submitted",
                "consent_granted",
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_step_reported() {
        let h = harness();
        let mut values = complete_values();
        values["email"] = json!("not-an-email");

        let response = h
            .server
            .post("/api/v1/forms/default-form/submissions")
            .json(&json!({ "values": values }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "validation_failed");
        assert_eq!(body["error"]["details"]["step"], 0);
        assert_eq!(
            body["error"]["details"]["errors"]["email"],
            "Veuillez saisir un email valide"
        );
        assert!(h.store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_field_rejected() {
        let h = harness();
        let mut values = complete_values();
        values["iban"] = json!("FR76");

        h.server
            .post("/api/v1/forms/default-form/submissions")
            .json(&json!({ "values": values }))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_store_failure_is_generic() {
        let h = harness();
        h.store.fail_contact_creation("duplicate key value violates unique constraint");

        let response = h
            .server
            .post("/api/v1/forms/default-form/submissions")
            .json(&json!({ "values": complete_values() }))
            .await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        let body: Value = response.json();
        assert_eq!(body["error"]["message"], "Une erreur est survenue. Veuillez réessayer.");
        assert_eq!(h.store.call_count(StoreCall::CreateProject), 0);
    }

    #[tokio::test]
    async fn test_prefill_token_fills_identity() {
        let h = harness_with(|state| state.with_prefill(PrefillVerifier::new(Some("s3cret"))));
        let token = sign(
            "s3cret",
            json!({
                "email": "claim@exemple.fr",
                "first_name": "Jeanne",
                "exp": chrono::Utc::now().timestamp() + 3600
            }),
        );
        let mut values = complete_values();
        let object = values.as_object_mut().unwrap();
        object.remove("email");
        object.remove("prenom");

        let response = h
            .server
            .post("/api/v1/forms/default-form/submissions")
            .json(&json!({ "values": values, "prefill_token": token }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let contact = &h.store.contacts()[0].1;
        assert_eq!(contact.email.as_deref(), Some("claim@exemple.fr"));
        assert_eq!(contact.prenom.as_deref(), Some("Jeanne"));
        let body: Value = response.json();
        assert_eq!(body["data"]["prefill_claims"]["email"], "claim@exemple.fr");
    }

    #[tokio::test]
    async fn test_prefill_refused_without_secret() {
        let h = harness();
        let token = sign("s3cret", json!({ "email": "a@b.com", "exp": chrono::Utc::now().timestamp() + 3600 }));

        h.server
            .post("/api/v1/forms/default-form/submissions")
            .json(&json!({ "values": complete_values(), "prefill_token": token }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}

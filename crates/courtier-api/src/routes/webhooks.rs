//! Email-provider webhook

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderName, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use courtier_core::{IngestOutcome, StoreError};

use crate::models::{WebhookAck, WebhookError};
use crate::ApiState;

const CORS_HEADERS: [(HeaderName, &str); 2] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        "authorization, x-client-info, apikey, content-type",
    ),
];

pub fn router() -> Router<Arc<ApiState>> {
    Router::new().route("/webhooks/brevo", any(brevo_webhook))
}

/// Receive one delivery event
#[utoipa::path(
    post,
    path = "/webhooks/brevo",
    request_body(content = String, description = "Provider event JSON", content_type = "application/json"),
    responses(
        (status = 200, description = "Event recorded or ignored", body = WebhookAck),
        (status = 500, description = "Malformed payload or store failure", body = WebhookError)
    ),
    tag = "webhooks"
)]
pub async fn brevo_webhook(
    State(state): State<Arc<ApiState>>,
    method: Method,
    body: Bytes,
) -> Response {
    if method == Method::OPTIONS {
        return (StatusCode::OK, CORS_HEADERS).into_response();
    }

    match state.ingestion.ingest(&body).await {
        Ok(IngestOutcome::Recorded { .. }) | Ok(IngestOutcome::Ignored { .. }) => ack(),
        Ok(IngestOutcome::InsertFailed { error, .. }) => {
            let unreachable = matches!(error, StoreError::Connection(_) | StoreError::Timeout);
            if unreachable || state.webhook.fail_on_insert_error {
                failure(error.to_string())
            } else {
                ack()
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Webhook payload rejected");
            failure(e.to_string())
        }
    }
}

fn ack() -> Response {
    (StatusCode::OK, CORS_HEADERS, Json(WebhookAck { success: true })).into_response()
}

fn failure(error: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        CORS_HEADERS,
        Json(WebhookError { error }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_router, WebhookConfig};
    use axum_test::TestServer;
    use courtier_core::infrastructure::{InMemoryDataStore, RecordingTrackingSink};
    use serde_json::json;

    const OPENED: &str = r#"{"event": "opened", "email": "a@b.com", "ts": 1700000000, "subject": "Hi"}"#;

    fn server(store: &Arc<InMemoryDataStore>, webhook: WebhookConfig) -> TestServer {
        let state = ApiState::new(store.clone(), Arc::new(RecordingTrackingSink::new()))
            .unwrap()
            .with_webhook(webhook);
        TestServer::new(build_router(state)).unwrap()
    }

    #[tokio::test]
    async fn test_preflight() {
        let store = Arc::new(InMemoryDataStore::new());
        let server = server(&store, WebhookConfig::default());

        let response = server.method(Method::OPTIONS, "/webhooks/brevo").await;

        response.assert_status_ok();
        assert_eq!(response.header("access-control-allow-origin"), "*");
        assert!(response.text().is_empty());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_opened_known_contact() {
        let store = Arc::new(InMemoryDataStore::new());
        let contact_id = store.seed_contact("a@b.com");
        let server = server(&store, WebhookConfig::default());

        let response = server.post("/webhooks/brevo").text(OPENED).await;

        response.assert_status_ok();
        response.assert_json(&json!({ "success": true }));
        assert_eq!(response.header("access-control-allow-origin"), "*");
        let rows = store.interactions();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].contact_id, Some(contact_id));
        assert_eq!(rows[0].created_at.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }

    #[tokio::test]
    async fn test_fractional_timestamp_acknowledged() {
        let store = Arc::new(InMemoryDataStore::new());
        let server = server(&store, WebhookConfig::default());

        let response = server
            .post("/webhooks/brevo")
            .json(&json!({ "event": "click", "email": "a@b.com", "ts": 1700000000.75, "link": "https://x.fr" }))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({ "success": true }));
        let rows = store.interactions();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].created_at.timestamp_millis(), 1_700_000_000_750);
    }

    #[tokio::test]
    async fn test_unknown_recipient_still_acknowledged() {
        let store = Arc::new(InMemoryDataStore::new());
        let server = server(&store, WebhookConfig::default());

        server.post("/webhooks/brevo").text(OPENED).await.assert_status_ok();

        assert_eq!(store.interactions().len(), 1);
        assert_eq!(store.interactions()[0].contact_id, None);
    }

    #[tokio::test]
    async fn test_unrecognized_event_acknowledged() {
        let store = Arc::new(InMemoryDataStore::new());
        let server = server(&store, WebhookConfig::default());

        let response = server
            .put("/webhooks/brevo")
            .json(&json!({ "event": "spam", "email": "a@b.com", "ts": 1700000000 }))
            .await;

        response.assert_status_ok();
        assert!(store.interactions().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let store = Arc::new(InMemoryDataStore::new());
        let server = server(&store, WebhookConfig::default());

        let response = server.post("/webhooks/brevo").text("{\"event\": ").await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = response.json();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_rejected_insert() {
        let store = Arc::new(InMemoryDataStore::new());
        store.fail_interactions("violates foreign key constraint");

        server(&store, WebhookConfig::default())
            .post("/webhooks/brevo")
            .text(OPENED)
            .await
            .assert_status_ok();

        server(&store, WebhookConfig { fail_on_insert_error: true })
            .post("/webhooks/brevo")
            .text(OPENED)
            .await
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }
}

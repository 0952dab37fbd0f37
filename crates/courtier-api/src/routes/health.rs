//! Health check endpoint

use axum::{response::IntoResponse, Json};

use crate::models::HealthResponse;

/// Health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use crate::{build_router, ApiState};
    use axum_test::TestServer;
    use courtier_core::infrastructure::{InMemoryDataStore, RecordingTrackingSink};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_health_and_docs() {
        let state = ApiState::new(
            Arc::new(InMemoryDataStore::new()),
            Arc::new(RecordingTrackingSink::new()),
        )
        .unwrap();
        let server = TestServer::new(build_router(state)).unwrap();

        let health: serde_json::Value = server.get("/health").await.json();
        assert_eq!(health["status"], "healthy");

        let docs: serde_json::Value = server.get("/api-docs/openapi.json").await.json();
        assert!(docs["paths"]["/webhooks/brevo"].is_object());
        assert!(docs["paths"]["/api/v1/forms/{form_id}/submissions"].is_object());
    }
}

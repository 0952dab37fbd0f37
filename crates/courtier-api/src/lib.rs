//! Courtier HTTP API
//!
//! Landing-page form endpoints and the email-provider webhook.
//!
//! ```text
//!  landing page ──► /api/v1/forms/:id/submissions ──► Wizard ──► DataStore
//!  email provider ──► /webhooks/brevo ──► InteractionIngestor ──► DataStore
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod prefill;
pub mod routes;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::{Json, Router};
use courtier_core::infrastructure::{
    InMemoryDataStore, LogTrackingSink, RestDataStore, RestStoreConfig,
};
use courtier_core::{
    health_quote_form, DataStore, DefinitionError, EventIngestion, FormDefinition,
    InteractionIngestor, LeadDefaults, SubmissionPipeline, TrackingSink,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

pub use config::{ApiConfig, ConfigError, WebhookConfig};
pub use error::ApiError;
pub use models::*;
pub use prefill::PrefillVerifier;

/// API state
#[derive(Clone)]
pub struct ApiState {
    pub forms: HashMap<String, Arc<FormDefinition>>,
    pub store: Arc<dyn DataStore>,
    pub tracker: Arc<dyn TrackingSink>,
    pub ingestion: Arc<dyn EventIngestion>,
    pub prefill: PrefillVerifier,
    pub lead_defaults: LeadDefaults,
    pub store_timeout: Duration,
    pub webhook: WebhookConfig,
}

impl ApiState {
    /// State serving the built-in `default-form`
    pub fn new(
        store: Arc<dyn DataStore>,
        tracker: Arc<dyn TrackingSink>,
    ) -> Result<Self, DefinitionError> {
        let ingestion = Arc::new(InteractionIngestor::new(store.clone()));
        let state = Self {
            forms: HashMap::new(),
            store,
            tracker,
            ingestion,
            prefill: PrefillVerifier::disabled(),
            lead_defaults: LeadDefaults::default(),
            store_timeout: Duration::from_secs(10),
            webhook: WebhookConfig::default(),
        };
        Ok(state.with_form(health_quote_form()?))
    }

    pub fn with_form(mut self, definition: FormDefinition) -> Self {
        self.forms
            .insert(definition.id().to_string(), Arc::new(definition));
        self
    }

    pub fn with_prefill(mut self, prefill: PrefillVerifier) -> Self {
        self.prefill = prefill;
        self
    }

    pub fn with_webhook(mut self, webhook: WebhookConfig) -> Self {
        self.webhook = webhook;
        self
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let timeout = config.store.request_timeout();
        let store: Arc<dyn DataStore> = match &config.store.url {
            Some(url) => {
                let key = config
                    .store
                    .service_key
                    .clone()
                    .ok_or(ConfigError::MissingServiceKey)?;
                tracing::info!(url = %url, "Using hosted store");
                Arc::new(RestDataStore::new(
                    RestStoreConfig::new(url, key).with_timeout(timeout),
                )?)
            }
            None => {
                tracing::warn!("No store url configured, records are kept in memory");
                Arc::new(InMemoryDataStore::new())
            }
        };

        let mut state = Self::new(store, Arc::new(LogTrackingSink)).map_err(|source| {
            ConfigError::Form { path: "built-in".into(), source }
        })?;
        state.prefill = PrefillVerifier::new(config.prefill.jwt_secret.as_deref());
        state.lead_defaults = config.lead_defaults.clone();
        state.store_timeout = timeout;
        state.webhook = config.webhook.clone();

        for path in &config.forms {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            let definition = FormDefinition::from_json(&content).map_err(|source| {
                ConfigError::Form { path: path.clone(), source }
            })?;
            tracing::info!(form_id = definition.id(), steps = definition.step_count(), "Form loaded");
            state = state.with_form(definition);
        }

        Ok(state)
    }

    pub fn form(&self, form_id: &str) -> Option<Arc<FormDefinition>> {
        self.forms.get(form_id).cloned()
    }

    /// Pipeline for one wizard session
    pub fn pipeline(&self) -> SubmissionPipeline {
        SubmissionPipeline::new(self.store.clone(), self.tracker.clone())
            .with_defaults(self.lead_defaults.clone())
            .with_timeout(self.store_timeout)
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Courtier API",
        description = "Lead capture forms and email-provider webhook",
        license(name = "Apache-2.0")
    ),
    paths(
        routes::health::health_check,
        routes::webhooks::brevo_webhook,
        routes::forms::get_form,
        routes::forms::submit_form,
    ),
    components(
        schemas(
            ErrorResponse, StepErrors, HealthResponse,
            WebhookAck, WebhookError, SubmissionBody
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "webhooks", description = "Email-provider delivery events"),
        (name = "forms", description = "Lead-capture forms")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the API router
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(routes::webhooks::router())
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

fn api_routes() -> Router<Arc<ApiState>> {
    Router::new()
        .nest("/forms", routes::forms::router())
        .layer(CorsLayer::permissive())
}

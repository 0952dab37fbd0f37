//! API Models

use courtier_core::{AttributionParams, ConsentFlags, ErrorMap, FieldValues};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard API response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorResponse>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorResponse {
                code: code.to_string(),
                message: message.to_string(),
                details: None,
            }),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        if let Some(error) = self.error.as_mut() {
            error.details = Some(details);
        }
        self
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub details: Option<serde_json::Value>,
}

/// Per-field errors of the step the wizard stopped on
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StepErrors {
    /// 0-based step index
    pub step: usize,
    #[schema(value_type = Object)]
    pub errors: ErrorMap,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Webhook acknowledgement
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WebhookAck {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WebhookError {
    pub error: String,
}

/// Completed wizard posted by a landing page
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmissionBody {
    /// Field id to value (string, or array for checkbox groups)
    #[schema(value_type = Object)]
    pub values: FieldValues,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub consents: ConsentFlags,
    #[serde(default)]
    pub page_slug: Option<String>,
    /// Landing-page query string (`?utm_source=...`)
    #[serde(default)]
    pub query: Option<String>,
    /// Explicit attribution, overriding the query string
    #[serde(default)]
    #[schema(value_type = Object)]
    pub utm: AttributionParams,
    /// Signed prefill token
    #[serde(default)]
    pub prefill_token: Option<String>,
}

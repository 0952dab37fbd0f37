//! HTTP error mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use courtier_core::{ErrorMap, SubmissionError, WizardError};
use thiserror::Error;

use crate::models::{ApiResponse, StepErrors};
use crate::prefill::PrefillError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("form not found: {0}")]
    FormNotFound(String),

    #[error(transparent)]
    Prefill(#[from] PrefillError),

    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error("step {step} is invalid")]
    Validation { step: usize, errors: ErrorMap },

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::FormNotFound(_) => StatusCode::NOT_FOUND,
            Self::Prefill(_) => StatusCode::UNAUTHORIZED,
            Self::Wizard(_) | Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Submission(SubmissionError::Invalid { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Submission(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::FormNotFound(_) => "form_not_found",
            Self::Prefill(_) => "invalid_prefill",
            Self::Wizard(_) => "unknown_field",
            Self::Validation { .. } | Self::Submission(SubmissionError::Invalid { .. }) => {
                "validation_failed"
            }
            Self::Submission(_) => "submission_failed",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            Self::Validation { step, errors }
            | Self::Submission(SubmissionError::Invalid { step, errors }) => {
                let details = StepErrors { step: *step, errors: errors.clone() };
                ApiResponse::<()>::error(self.code(), &self.to_string())
                    .with_details(serde_json::to_value(details).unwrap_or_default())
            }
            // Store details stay in the logs
            Self::Submission(e) => ApiResponse::error(self.code(), e.user_message()),
            _ => ApiResponse::error(self.code(), &self.to_string()),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtier_core::StoreError;

    #[test]
    fn test_submission_status() {
        let invalid = ApiError::from(SubmissionError::Invalid { step: 1, errors: ErrorMap::new() });
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(invalid.code(), "validation_failed");

        let failed = ApiError::from(SubmissionError::ContactCreation(StoreError::Timeout));
        assert_eq!(failed.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(failed.code(), "submission_failed");
    }
}

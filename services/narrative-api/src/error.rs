//! HTTP error responses.

use axum::{
    extract::rejection::JsonRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::AnalysisError;

/// Message returned to clients for any analysis failure. Details stay in the logs.
pub const ANALYSIS_FAILED_MESSAGE: &str = "Analysis failed. Please try again later.";

/// Errors returned by the HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("Invalid or missing API key")]
    Unauthorized,

    #[error("Request body exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("Not Found")]
    NotFound,

    #[error("analysis failed: {0}")]
    AnalysisFailed(#[from] AnalysisError),
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::AnalysisFailed(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge {
                limit: crate::MAX_BODY_BYTES,
            }
        } else {
            ApiError::Unprocessable(rejection.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            ApiError::AnalysisFailed(_) => ANALYSIS_FAILED_MESSAGE.to_string(),
            other => other.to_string(),
        };
        let body = Json(ErrorResponse { detail });

        match self {
            ApiError::Unauthorized => {
                (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Stage;

    #[test]
    fn test_status_mapping() {
        let cases = vec![
            (ApiError::Validation("Text is required".into()), StatusCode::BAD_REQUEST),
            (ApiError::Unprocessable("bad json".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (ApiError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                ApiError::PayloadTooLarge { limit: 10 },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (ApiError::NotFound, StatusCode::NOT_FOUND),
            (
                ApiError::AnalysisFailed(AnalysisError::NotConfigured),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status(), expected, "{err}");
        }
    }

    #[test]
    fn test_unauthorized_sets_challenge() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[test]
    fn test_analysis_failure_is_opaque() {
        let err: ApiError = AnalysisError::Malformed {
            stage: Stage::Sentences,
            reason: "secret upstream detail".into(),
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }
}

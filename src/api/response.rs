//! Response types for the payroll engine API.
//!
//! This module defines the error response structures and error handling
//! for the HTTP API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{LoanRequest, RepaymentOutcome};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let status = match &error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            EngineError::Validation { .. } => StatusCode::BAD_REQUEST,
            EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
            EngineError::Forbidden { .. } => StatusCode::FORBIDDEN,
            EngineError::Computation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            EngineError::InvalidTransition { .. } => StatusCode::CONFLICT,
        };
        let details = match &error {
            EngineError::Validation { field, .. } => Some(format!("field: {}", field)),
            EngineError::NotFound { entity, .. } | EngineError::Forbidden { entity, .. } => {
                Some(format!("entity: {}", entity))
            }
            _ => None,
        };

        ApiErrorResponse {
            status,
            error: ApiError {
                code: error.code().to_string(),
                message: error.to_string(),
                details,
            },
        }
    }
}

/// Response body for `POST /loans/:id/repayments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepaymentResponse {
    /// The loan after the call.
    pub loan: LoanRequest,
    /// Whether the installment was newly applied.
    pub outcome: RepaymentOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_engine_errors_map_to_statuses() {
        let cases = [
            (EngineError::validation("month", "out of range"), StatusCode::BAD_REQUEST),
            (
                EngineError::NotFound {
                    entity: "employee",
                    id: "emp_404".to_string(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                EngineError::Forbidden {
                    entity: "payslip",
                    id: "p1".to_string(),
                },
                StatusCode::FORBIDDEN,
            ),
            (EngineError::computation("zero tenure"), StatusCode::UNPROCESSABLE_ENTITY),
            (
                EngineError::InvalidTransition {
                    entity: "loan",
                    id: "l1".to_string(),
                    from: "rejected".to_string(),
                    to: "approved".to_string(),
                },
                StatusCode::CONFLICT,
            ),
            (
                EngineError::ConfigNotFound {
                    path: "x".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            let code = error.code();
            let response: ApiErrorResponse = error.into();
            assert_eq!(response.status, status);
            assert_eq!(response.error.code, code);
        }
    }

    #[test]
    fn test_validation_error_names_field() {
        let response: ApiErrorResponse = EngineError::validation("days_worked", "negative").into();
        assert_eq!(response.error.details.as_deref(), Some("field: days_worked"));
    }
}

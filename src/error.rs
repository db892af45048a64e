/*
 * Responsibility
 * - Gateway-wide AppError
 * - IntoResponse (HTTP status + JSON error body)
 * - Mapping of gate outcomes (malformed credential / policy denied) onto HTTP
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
}

impl AppError {
    fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn malformed_credential() -> Self {
        Self::bad_request(
            "MALFORMED_CREDENTIAL",
            "credential header does not use the expected scheme",
        )
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match self {
            AppError::BadRequest { code, message } => (code, message),
            AppError::Unauthorized => ("UNAUTHORIZED", "unauthorized".into()),
            AppError::NotFound { resource } => ("NOT_FOUND", format!("{resource} not found.")),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_errors_map_to_distinct_client_statuses() {
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::malformed_credential().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn responses_carry_the_status() {
        let response = AppError::not_found("route").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::malformed_credential().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

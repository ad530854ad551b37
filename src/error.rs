//! HTTP-facing error type.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::domain::repositories::RepositoryError;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: Value,
}

/// Error returned by handlers, rendered as
/// `{"error": {"code", "message", "details"}}`.
///
/// Server-side variants carry sanitized messages only. Driver and cache
/// error strings go to the logs, never to the client.
#[derive(Debug)]
pub enum AppError {
    Validation { message: String, details: Value },
    NotFound { message: String, details: Value },
    Conflict { message: String, details: Value },
    Unavailable { message: String, details: Value },
    Timeout { message: String, details: Value },
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::Unavailable {
            message: message.into(),
            details,
        }
    }
    pub fn timeout(message: impl Into<String>, details: Value) -> Self {
        Self::Timeout {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message, details) = match self {
            AppError::Validation { message, details } => ("validation_error", message, details),
            AppError::NotFound { message, details } => ("not_found", message, details),
            AppError::Conflict { message, details } => ("conflict", message, details),
            AppError::Unavailable { message, details } => ("unavailable", message, details),
            AppError::Timeout { message, details } => ("timeout", message, details),
            AppError::Internal { message, details } => ("internal_error", message, details),
        };

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound { id } => {
                AppError::not_found("Book not found", json!({ "id": id }))
            }
            RepositoryError::AlreadyExists { id } => {
                AppError::conflict("Book already exists", json!({ "id": id }))
            }
            RepositoryError::Unavailable(_) => {
                AppError::unavailable("Database is unavailable", json!({}))
            }
            RepositoryError::DeadlineExceeded(limit) => AppError::timeout(
                "Request deadline exceeded",
                json!({ "timeout_ms": limit.as_millis() as u64 }),
            ),
            RepositoryError::Store(_) => AppError::internal("Database error", json!({})),
            RepositoryError::Cache(_) | RepositoryError::Codec(_) => {
                AppError::internal("Cache error", json!({}))
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(
            "Invalid request body",
            json!({ "reason": rejection.body_text() }),
        )
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::bad_request(
            "Invalid query parameters",
            json!({ "reason": rejection.body_text() }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::CacheError;
    use crate::infrastructure::database::ConnectionError;
    use std::time::Duration;

    #[test]
    fn test_repository_errors_map_to_statuses() {
        let cases = [
            (RepositoryError::NotFound { id: 1 }, StatusCode::NOT_FOUND),
            (RepositoryError::AlreadyExists { id: 1 }, StatusCode::CONFLICT),
            (
                RepositoryError::Unavailable(ConnectionError::Unavailable { attempts: 3 }),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                RepositoryError::DeadlineExceeded(Duration::from_secs(30)),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                RepositoryError::Store(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                RepositoryError::Cache(CacheError::ConnectionError("refused".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (repo_err, status) in cases {
            assert_eq!(AppError::from(repo_err).status(), status);
        }
    }

    #[test]
    fn test_server_errors_do_not_leak_driver_text() {
        let err = AppError::from(RepositoryError::Cache(CacheError::ConnectionError(
            "redis://:hunter2@cache:6379 refused".into(),
        )));

        match err {
            AppError::Internal { message, details } => {
                assert_eq!(message, "Cache error");
                assert!(!details.to_string().contains("hunter2"));
            }
            other => panic!("unexpected mapping: {other:?}"),
        }
    }
}

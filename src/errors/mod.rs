//! Unified error handling with consistent API response envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::services::status::Status;

/// Fallback shown when a repository failure carries no message of its own.
pub const GENERIC_FAILURE: &str = "The request could not be completed";

/// Error detail in the API response envelope.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Consistent JSON envelope for all API responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap a successful result in the envelope.
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            data: Some(data),
            error: None,
        })
    }

    /// Wrap an error in the envelope.
    pub fn error(code: &str, message: &str) -> Json<Self> {
        Json(Self {
            data: None,
            error: Some(ApiError {
                code: code.to_string(),
                message: message.to_string(),
            }),
        })
    }
}

/// The kind of mutation a caller attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
    ChangeStatus,
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verb = match self {
            Self::Create => "create",
            Self::Update => "edit",
            Self::Delete => "delete",
            Self::ChangeStatus => "change the status of",
        };
        f.write_str(verb)
    }
}

/// Console error taxonomy.
///
/// `Validation`, `BlockedByLifecycle` and `Forbidden` are decided locally and
/// never reach a repository. `Repository` carries the upstream message
/// verbatim. `StaleResponseDiscarded` never leaves the list controller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConsoleError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Cannot {action} {resource}: it is currently {status}")]
    BlockedByLifecycle {
        action: MutationKind,
        resource: &'static str,
        status: Status,
    },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Repository(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Discarded stale response for request #{generation}")]
    StaleResponseDiscarded { generation: u64 },
}

impl ConsoleError {
    /// Build a repository error, substituting the generic text for a missing message.
    pub fn repository(message: Option<String>) -> Self {
        match message {
            Some(msg) if !msg.trim().is_empty() => Self::Repository(msg),
            _ => Self::Repository(GENERIC_FAILURE.to_string()),
        }
    }

    /// Check if this error represents a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<validator::ValidationErrors> for ConsoleError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ConsoleError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ConsoleError::BlockedByLifecycle { .. } => {
                (StatusCode::CONFLICT, "BLOCKED_BY_LIFECYCLE")
            }
            ConsoleError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ConsoleError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ConsoleError::Repository(msg) => {
                tracing::warn!(error = %msg, "Repository error");
                (StatusCode::BAD_GATEWAY, "REPOSITORY_ERROR")
            }
            ConsoleError::Unsupported(_) => (StatusCode::NOT_IMPLEMENTED, "UNSUPPORTED"),
            ConsoleError::StaleResponseDiscarded { .. } => {
                tracing::error!(error = %self, "Stale response escaped the list controller");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = ApiResponse::<()> {
            data: None,
            error: Some(ApiError {
                code: code.to_string(),
                message: self.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Message returned to clients in place of internal failure details.
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Please try again later.";

/// Failure taxonomy shared by all services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Caller-supplied data is malformed; one message per violated rule.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Email is already in use.")]
    DuplicateEmail,

    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error("Invalid or expired password reset token.")]
    InvalidOrExpiredCode,

    /// A store, mailer or asset backend failed. Carries `anyhow` context.
    #[error(transparent)]
    Dependency(anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(vec![msg.into()])
    }

    /// Human-readable messages safe to hand to the end user.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ServiceError::Validation(msgs) => msgs.clone(),
            ServiceError::Dependency(_) => vec![UNEXPECTED_ERROR.to_string()],
            other => vec![other.to_string()],
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::DuplicateEmail => StatusCode::CONFLICT,
            ServiceError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ServiceError::InvalidOrExpiredCode => StatusCode::BAD_REQUEST,
            ServiceError::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ServiceError::Dependency(e) = &self {
            tracing::error!(error = ?e, "dependency failure");
        }
        (status, Json(json!({ "error": self.messages() }))).into_response()
    }
}

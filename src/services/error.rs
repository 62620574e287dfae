use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::dtos::ErrorResponse;

/// Error taxonomy for the account core.
///
/// `AccountNotFound` and `PasswordInvalid` exist so login failures can be
/// logged precisely, but both collapse to the same 401 body so a caller can
/// never tell whether an email is registered.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Password is too weak")]
    WeakPassword,

    #[error("{0}")]
    AlreadyExists(String),

    #[error("Account not found")]
    AccountNotFound,

    #[error("Invalid password")]
    PasswordInvalid,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Not authorized")]
    NotAuthorized,

    #[error("Configuration error: {0}")]
    Config(anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    /// The single unauthenticated body served for any credential failure.
    pub const INVALID_CREDENTIALS: &'static str = "Invalid email or password";
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServiceError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServiceError::WeakPassword => (
                StatusCode::BAD_REQUEST,
                "Password is too weak".to_string(),
            ),
            ServiceError::AlreadyExists(msg) => (StatusCode::CONFLICT, msg.clone()),
            ServiceError::AccountNotFound => {
                (StatusCode::NOT_FOUND, "Account not found".to_string())
            }
            // Login-path failure: same body as a lookup miss surfaced by the
            // orchestrator, so the two are outwardly indistinguishable.
            ServiceError::PasswordInvalid => (
                StatusCode::UNAUTHORIZED,
                Self::INVALID_CREDENTIALS.to_string(),
            ),
            ServiceError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token".to_string(),
            ),
            ServiceError::NotAuthorized => {
                (StatusCode::UNAUTHORIZED, "Not authorized".to_string())
            }
            ServiceError::Config(err) => {
                tracing::error!(error = %err, "Configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ServiceError::Internal(err) => {
                tracing::error!(error = %err, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Unauthenticated outcome for the login surface: logs the precise cause,
/// returns the generic credential failure.
pub fn invalid_credentials(cause: &ServiceError, email: &str) -> ServiceError {
    tracing::warn!(email = %email, cause = %cause, "Login rejected");
    ServiceError::PasswordInvalid
}

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{AccountKind, AccountResponse, Currency, OrgRole, SubscriptionTier};
use crate::services::ServiceError;

/// Registration payload for all four account kinds. Which optional fields
/// are required depends on `account_type`; the orchestrator enforces that.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[serde(default = "default_account_kind")]
    pub account_type: AccountKind,

    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,

    // Strength is a core policy (WeakPassword), not a DTO validation.
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "abc$1234")]
    pub password: String,

    #[schema(example = "jdoe")]
    pub username: Option<String>,

    #[schema(example = "Jane Doe")]
    pub full_name: Option<String>,

    /// Display name for organization and admin accounts.
    #[schema(example = "Acme Clinic")]
    pub name: Option<String>,

    /// Required when `account_type` is `org_member`.
    pub organization_id: Option<Uuid>,

    /// Org member role; defaults to `staff`.
    pub role: Option<OrgRole>,

    pub subscription_tier: Option<SubscriptionTier>,

    pub currency: Option<Currency>,
}

fn default_account_kind() -> AccountKind {
    AccountKind::User
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "abc$1234")]
    pub password: String,

    /// Which account table and role rules apply to this attempt.
    #[serde(default = "default_account_kind")]
    pub login_context: AccountKind,
}

/// Logout body; tokens may equally arrive via the auth cookies.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LogoutRequest {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    #[schema(example = "refresh-token-123")]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub role: OrgRole,
}

/// Authenticated response for register and login.
///
/// For web clients the token fields are null (tokens travel as HttpOnly
/// cookies instead); other clients get them in the body.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub account: AccountResponse,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    #[schema(example = "bearer")]
    pub token_type: String,
    /// Resolved role; present on login responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "org_admin")]
    pub role: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogoutResponse {
    #[schema(example = "Logged out successfully")]
    pub message: String,
    /// Whether at least one presented token was actually revoked.
    pub token_invalidated: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Opaque delivery-channel indicator from the `X-Client-Type` header.
/// Decides only whether tokens travel in the body or as protected cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientType {
    Web,
    AdminWeb,
    PartnerWeb,
    Mobile,
}

pub const CLIENT_TYPE_HEADER: &str = "x-client-type";

impl ClientType {
    /// Missing header defaults to `web`; an unknown value is the caller's
    /// fault.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ServiceError> {
        let raw = headers
            .get(CLIENT_TYPE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("web");

        match raw {
            "web" => Ok(ClientType::Web),
            "admin-web" => Ok(ClientType::AdminWeb),
            "partner-web" => Ok(ClientType::PartnerWeb),
            "mobile" => Ok(ClientType::Mobile),
            other => Err(ServiceError::Validation(format!(
                "Invalid client type: {}",
                other
            ))),
        }
    }

    /// Only plain web clients receive cookie-delivered tokens.
    pub fn wants_cookies(&self) -> bool {
        matches!(self, ClientType::Web)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_type_defaults_to_web() {
        let headers = HeaderMap::new();
        assert_eq!(ClientType::from_headers(&headers).unwrap(), ClientType::Web);
    }

    #[test]
    fn client_type_rejects_unknown_values() {
        let mut headers = HeaderMap::new();
        headers.insert(CLIENT_TYPE_HEADER, HeaderValue::from_static("toaster"));
        assert!(ClientType::from_headers(&headers).is_err());
    }

    #[test]
    fn only_web_clients_get_cookies() {
        assert!(ClientType::Web.wants_cookies());
        assert!(!ClientType::AdminWeb.wants_cookies());
        assert!(!ClientType::PartnerWeb.wants_cookies());
        assert!(!ClientType::Mobile.wants_cookies());
    }
}

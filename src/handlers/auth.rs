//! Authentication handlers.
//!
//! Token delivery is decided per request by the `X-Client-Type` header:
//! plain web clients get HttpOnly cookies and null token fields in the
//! body, every other client gets tokens in the body.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::dtos::auth::{
    AuthResponse, ClientType, LoginRequest, LogoutRequest, LogoutResponse, RefreshRequest,
    RegisterRequest, TokenRefreshResponse,
};
use crate::dtos::ErrorResponse;
use crate::services::{AuthOutcome, ServiceError};
use crate::utils::ValidatedJson;
use crate::AppState;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

// Fixed cookie lifetimes; the access cookie expires before the token it
// carries, forcing web clients through the refresh endpoint sooner.
const ACCESS_COOKIE_MAX_AGE: Duration = Duration::minutes(15);
const REFRESH_COOKIE_MAX_AGE: Duration = Duration::days(7);

fn auth_cookie(name: &'static str, value: String, max_age: Duration) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").build()
}

/// Split the outcome between cookies and body according to client type.
fn deliver(jar: CookieJar, client: ClientType, outcome: AuthOutcome) -> (CookieJar, AuthResponse) {
    let account = outcome.account.sanitized();
    if client.wants_cookies() {
        let jar = jar
            .add(auth_cookie(
                ACCESS_COOKIE,
                outcome.access_token,
                ACCESS_COOKIE_MAX_AGE,
            ))
            .add(auth_cookie(
                REFRESH_COOKIE,
                outcome.refresh_token,
                REFRESH_COOKIE_MAX_AGE,
            ));
        (
            jar,
            AuthResponse {
                account,
                access_token: None,
                refresh_token: None,
                token_type: "bearer".to_string(),
                role: outcome.role,
            },
        )
    } else {
        (
            jar,
            AuthResponse {
                account,
                access_token: Some(outcome.access_token),
                refresh_token: Some(outcome.refresh_token),
                token_type: "bearer".to_string(),
                role: outcome.role,
            },
        )
    }
}

/// Register a new account of any kind
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid or weak input", body = ErrorResponse),
        (status = 409, description = "Account already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let client = ClientType::from_headers(&headers)?;
    let outcome = state.auth.register(req).await?;
    let (jar, body) = deliver(jar, client, outcome);
    Ok((StatusCode::CREATED, jar, Json(body)))
}

/// Log in within one account context
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = AuthResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let client = ClientType::from_headers(&headers)?;
    let outcome = state.auth.login(req).await?;
    let (jar, body) = deliver(jar, client, outcome);
    Ok((StatusCode::OK, jar, Json(body)))
}

/// Log out, revoking presented tokens
#[utoipa::path(
    post,
    path = "/auth/logout",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Logout processed", body = LogoutResponse)
    ),
    tag = "Authentication"
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<LogoutRequest>>,
) -> impl IntoResponse {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let access_token = jar
        .get(ACCESS_COOKIE)
        .map(|c| c.value().to_string())
        .or(body.access_token);
    let refresh_token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .or(body.refresh_token);

    let outcome = state
        .auth
        .logout(access_token.as_deref(), refresh_token.as_deref())
        .await;

    let jar = jar
        .remove(removal_cookie(ACCESS_COOKIE))
        .remove(removal_cookie(REFRESH_COOKIE));

    (
        jar,
        Json(LogoutResponse {
            message: "Logged out successfully".to_string(),
            token_invalidated: outcome.token_invalidated,
        }),
    )
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token issued", body = TokenRefreshResponse),
        (status = 400, description = "No refresh token presented", body = ErrorResponse),
        (status = 401, description = "Invalid or revoked refresh token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<impl IntoResponse, ServiceError> {
    let client = ClientType::from_headers(&headers)?;
    let refresh_token = body
        .map(|Json(b)| b.refresh_token)
        .or_else(|| jar.get(REFRESH_COOKIE).map(|c| c.value().to_string()))
        .ok_or_else(|| ServiceError::Validation("refresh_token is required".to_string()))?;

    let access_token = state.auth.refresh(&refresh_token).await?;

    let jar = if client.wants_cookies() {
        jar.add(auth_cookie(
            ACCESS_COOKIE,
            access_token.clone(),
            ACCESS_COOKIE_MAX_AGE,
        ))
    } else {
        jar
    };

    Ok((
        jar,
        Json(TokenRefreshResponse {
            access_token,
            token_type: "bearer".to_string(),
        }),
    ))
}

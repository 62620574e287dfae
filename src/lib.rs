pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::SecurityScheme,
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AccountConfig;
use crate::services::{
    AccountDirectory, AccountStore, AuthService, MembershipService, RevocationStore, ServiceError,
    TokenService,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::refresh,
        handlers::account::get_me,
        handlers::account::list_org_members,
        handlers::account::list_user_memberships,
        handlers::account::update_member_role,
        handlers::account::remove_member,
    ),
    components(
        schemas(
            dtos::ErrorResponse,
            dtos::auth::RegisterRequest,
            dtos::auth::LoginRequest,
            dtos::auth::LogoutRequest,
            dtos::auth::RefreshRequest,
            dtos::auth::UpdateRoleRequest,
            dtos::auth::AuthResponse,
            dtos::auth::TokenRefreshResponse,
            dtos::auth::LogoutResponse,
            dtos::auth::MessageResponse,
            models::AccountResponse,
            models::UserResponse,
            models::OrganizationResponse,
            models::OrgMemberResponse,
            models::AdminResponse,
            models::AccountKind,
            models::UserType,
            models::OrgRole,
            models::SubscriptionTier,
            models::Currency,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login, and token management"),
        (name = "Account", description = "Current account resolution"),
        (name = "Membership", description = "Organization membership management"),
        (name = "Observability", description = "Service health"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: AccountConfig,
    pub revocation: Arc<dyn RevocationStore>,
    pub tokens: TokenService,
    pub directory: AccountDirectory,
    pub membership: MembershipService,
    pub auth: AuthService,
}

impl AppState {
    /// Wire the full service graph over the given stores.
    pub fn new(
        config: AccountConfig,
        store: Arc<dyn AccountStore>,
        revocation: Arc<dyn RevocationStore>,
    ) -> Self {
        let tokens = TokenService::new(&config.jwt, revocation.clone());
        let directory = AccountDirectory::new(store.clone());
        let membership = MembershipService::new(store, directory.clone());
        let auth = AuthService::new(directory.clone(), membership.clone(), tokens.clone());

        Self {
            config,
            revocation,
            tokens,
            directory,
            membership,
            auth,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    // Routes behind the auth middleware
    let protected = Router::new()
        .route("/users/me", get(handlers::account::get_me))
        .route(
            "/orgs/:org_id/members",
            get(handlers::account::list_org_members),
        )
        .route(
            "/users/:user_id/memberships",
            get(handlers::account::list_user_memberships),
        )
        .route(
            "/orgs/:org_id/members/:user_id/role",
            patch(handlers::account::update_member_role),
        )
        .route(
            "/orgs/:org_id/members/:user_id",
            delete(handlers::account::remove_member),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let mut app = Router::new().route("/health", get(health_check));

    // Swagger UI only outside production
    if state.config.environment == config::Environment::Dev {
        app = app.merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()));
    }

    app.route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .merge(protected)
        .with_state(state.clone())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(
                    state
                        .config
                        .security
                        .allowed_origins
                        .iter()
                        .filter_map(|o| match o.parse::<HeaderValue>() {
                            Ok(value) => Some(value),
                            Err(e) => {
                                tracing::error!(origin = %o, error = %e, "Skipping invalid CORS origin");
                                None
                            }
                        })
                        .collect::<Vec<HeaderValue>>(),
                )
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::AUTHORIZATION,
                    header::CONTENT_TYPE,
                    header::HeaderName::from_static("x-client-type"),
                ])
                .allow_credentials(true),
        )
}

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 500, description = "Service is unhealthy")
    ),
    tag = "Observability"
)]
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state.revocation.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Revocation store health check failed");
        ServiceError::Internal(e)
    })?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "environment": format!("{:?}", state.config.environment),
        "checks": {
            "revocation_store": "up"
        }
    })))
}

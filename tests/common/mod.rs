//! Shared helpers for account-service integration tests.
//!
//! Tests run the real router over in-memory stores, so no external
//! services are needed.

#![allow(dead_code)]

use std::sync::Arc;

use account_service::{
    build_router,
    config::{AccountConfig, Environment, JwtConfig, RedisConfig, SecurityConfig},
    services::{MemoryRevocationStore, MemoryStore},
    AppState,
};
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

pub fn test_config() -> AccountConfig {
    AccountConfig {
        environment: Environment::Dev,
        service_name: "account-service-test".to_string(),
        service_version: "0.0.0".to_string(),
        log_level: "error".to_string(),
        port: 0,
        jwt: JwtConfig {
            secret: "integration-test-secret-0123456789".to_string(),
            access_token_expiry_minutes: 30,
            refresh_token_expiry_days: 7,
        },
        redis: RedisConfig { url: None },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::new(
            test_config(),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryRevocationStore::new()),
        );
        let router = build_router(state.clone());
        Self { router, state }
    }

    pub async fn request(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }

    /// POST json as a mobile client, so tokens come back in the body.
    pub async fn post_json(&self, uri: &str, body: Value) -> Response<Body> {
        self.post_json_as(uri, "mobile", body).await
    }

    pub async fn post_json_as(
        &self,
        uri: &str,
        client_type: &str,
        body: Value,
    ) -> Response<Body> {
        self.request(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-client-type", client_type)
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn get_with_token(&self, uri: &str, access_token: &str) -> Response<Body> {
        self.request(
            Request::builder()
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Register an individual user and return the response body.
    pub async fn register_user(&self, email: &str, username: &str) -> Value {
        let response = self
            .post_json(
                "/auth/register",
                json!({
                    "email": email,
                    "password": "abc$1234",
                    "username": username,
                    "full_name": "Test User",
                }),
            )
            .await;
        assert_eq!(response.status(), 201, "user registration failed");
        body_json(response).await
    }

    /// Register an organization and return the response body.
    pub async fn register_org(&self, email: &str, name: &str) -> Value {
        let response = self
            .post_json(
                "/auth/register",
                json!({
                    "account_type": "organization",
                    "email": email,
                    "password": "abc$1234",
                    "name": name,
                }),
            )
            .await;
        assert_eq!(response.status(), 201, "organization registration failed");
        body_json(response).await
    }

    /// Log in within the given context and return the response body.
    pub async fn login(&self, context: &str, email: &str, password: &str) -> Value {
        let response = self
            .post_json(
                "/auth/login",
                json!({
                    "email": email,
                    "password": password,
                    "login_context": context,
                }),
            )
            .await;
        assert_eq!(response.status(), 200, "login failed");
        body_json(response).await
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

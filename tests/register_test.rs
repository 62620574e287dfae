mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{body_json, TestApp};

#[tokio::test]
async fn test_register_user_returns_tokens_and_sanitized_account() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/auth/register",
            json!({
                "email": "jane@test.com",
                "password": "abc$1234",
                "username": "jane",
                "full_name": "Jane Doe",
            }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;

    assert_eq!(body["account"]["account_type"], "user");
    assert_eq!(body["account"]["email"], "jane@test.com");
    assert!(body["account"].get("password_hash").is_none());
    assert_eq!(body["token_type"], "bearer");
    assert!(body["access_token"].is_string());
    assert!(body["refresh_token"].is_string());
    // Role is a login concept
    assert!(body.get("role").is_none());
}

#[tokio::test]
async fn test_register_organization_and_admin() {
    let app = TestApp::new();

    let org = app.register_org("clinic@test.com", "Acme Clinic").await;
    assert_eq!(org["account"]["account_type"], "organization");
    assert_eq!(org["account"]["name"], "Acme Clinic");

    let response = app
        .post_json(
            "/auth/register",
            json!({
                "account_type": "admin",
                "email": "root@test.com",
                "password": "abc$1234",
                "name": "Root",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let admin = body_json(response).await;
    assert_eq!(admin["account"]["account_type"], "admin");
}

#[tokio::test]
async fn test_second_admin_is_rejected_even_with_a_different_email() {
    let app = TestApp::new();

    let first = app
        .post_json(
            "/auth/register",
            json!({
                "account_type": "admin",
                "email": "root@test.com",
                "password": "abc$1234",
                "name": "Root",
            }),
        )
        .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .post_json(
            "/auth/register",
            json!({
                "account_type": "admin",
                "email": "other-root@test.com",
                "password": "abc$1234",
                "name": "Also Root",
            }),
        )
        .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_email_is_unique_across_user_org_and_admin_kinds() {
    // Whichever kind claims the email first, every other kind must then
    // see it as taken
    for seed in ["user", "organization", "admin"] {
        let app = TestApp::new();
        let seeded = app
            .post_json(
                "/auth/register",
                json!({
                    "account_type": seed,
                    "email": "shared@test.com",
                    "password": "abc$1234",
                    "username": "shared",
                    "full_name": "Shared",
                    "name": "Shared",
                }),
            )
            .await;
        assert_eq!(seeded.status(), StatusCode::CREATED);

        for other in ["user", "organization", "admin"] {
            if other == seed {
                continue;
            }
            let response = app
                .post_json(
                    "/auth/register",
                    json!({
                        "account_type": other,
                        "email": "shared@test.com",
                        "password": "abc$1234",
                        "username": "other",
                        "full_name": "Other",
                        "name": "Other",
                    }),
                )
                .await;
            assert_eq!(
                response.status(),
                StatusCode::CONFLICT,
                "{} seeded, {} should conflict",
                seed,
                other
            );
        }
    }
}

#[tokio::test]
async fn test_weak_password_is_rejected() {
    let app = TestApp::new();

    // No symbol, no digit, too short
    for password in ["password", "abcdefg1", "a$1"] {
        let response = app
            .post_json(
                "/auth/register",
                json!({
                    "email": "jane@test.com",
                    "password": password,
                    "username": "jane",
                    "full_name": "Jane Doe",
                }),
            )
            .await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "password {:?} should be rejected",
            password
        );
    }
}

#[tokio::test]
async fn test_invalid_email_format_is_a_bad_request() {
    let app = TestApp::new();

    // Field-level validation failures use the same 400 shape as every
    // other input error
    let response = app
        .post_json(
            "/auth/register",
            json!({
                "email": "not-an-email",
                "password": "abc$1234",
                "username": "jane",
                "full_name": "Jane Doe",
            }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("Validation error"));
}

#[tokio::test]
async fn test_missing_username_for_user_is_a_bad_request() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/auth/register",
            json!({
                "email": "jane@test.com",
                "password": "abc$1234",
                "full_name": "Jane Doe",
            }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_org_member_requires_an_organization_id() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/auth/register",
            json!({
                "account_type": "org_member",
                "email": "m@test.com",
                "password": "abc$1234",
                "username": "m",
                "full_name": "Member",
            }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_org_member_email_conflicts_only_within_the_same_org() {
    let app = TestApp::new();
    let org_a = app.register_org("a@test.com", "Org A").await;
    let org_b = app.register_org("b@test.com", "Org B").await;

    let member = |org: &serde_json::Value, role: &str| {
        json!({
            "account_type": "org_member",
            "email": "worker@test.com",
            "password": "abc$1234",
            "username": "worker",
            "full_name": "Worker",
            "organization_id": org["account"]["id"],
            "role": role,
        })
    };

    let first = app.post_json("/auth/register", member(&org_a, "doctor")).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    // Same email in the same org conflicts
    let dup = app.post_json("/auth/register", member(&org_a, "nurse")).await;
    assert_eq!(dup.status(), StatusCode::CONFLICT);

    // Same email in another org is a distinct membership
    let second = app.post_json("/auth/register", member(&org_b, "nurse")).await;
    assert_eq!(second.status(), StatusCode::CREATED);
    let body = body_json(second).await;
    assert_eq!(body["account"]["role"], "nurse");
}

#[tokio::test]
async fn test_existing_user_registering_as_org_member_gets_linked() {
    let app = TestApp::new();
    let user = app.register_user("jane@test.com", "jane").await;
    let org = app.register_org("clinic@test.com", "Clinic").await;

    let response = app
        .post_json(
            "/auth/register",
            json!({
                "account_type": "org_member",
                "email": "jane@test.com",
                "password": "abc$1234",
                "organization_id": org["account"]["id"],
                "role": "doctor",
            }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["account"]["account_type"], "org_member");
    assert_eq!(body["account"]["user_id"], user["account"]["id"]);
    assert_eq!(body["account"]["role"], "doctor");
    // The membership is its own identity
    assert_ne!(body["account"]["id"], user["account"]["id"]);
}

#[tokio::test]
async fn test_org_member_with_an_org_owned_email_conflicts() {
    let app = TestApp::new();
    let org = app.register_org("clinic@test.com", "Clinic").await;

    let response = app
        .post_json(
            "/auth/register",
            json!({
                "account_type": "org_member",
                "email": "clinic@test.com",
                "password": "abc$1234",
                "username": "clone",
                "full_name": "Clone",
                "organization_id": org["account"]["id"],
            }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_registration_email_is_lowercased() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/auth/register",
            json!({
                "email": "Jane@Test.COM",
                "password": "abc$1234",
                "username": "jane",
                "full_name": "Jane Doe",
            }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["account"]["email"], "jane@test.com");
}

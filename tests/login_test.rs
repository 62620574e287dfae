mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{body_json, TestApp};

#[tokio::test]
async fn test_login_resolves_the_registered_account() {
    let app = TestApp::new();
    let registered = app.register_user("jane@test.com", "jane").await;

    let logged_in = app.login("user", "jane@test.com", "abc$1234").await;

    assert_eq!(logged_in["account"]["id"], registered["account"]["id"]);
    assert_eq!(logged_in["role"], "user");
    assert!(logged_in["access_token"].is_string());
}

#[tokio::test]
async fn test_login_email_is_case_insensitive() {
    let app = TestApp::new();
    app.register_user("jane@test.com", "jane").await;

    let body = app.login("user", "Jane@TEST.com", "abc$1234").await;
    assert_eq!(body["account"]["email"], "jane@test.com");
}

#[tokio::test]
async fn test_each_context_resolves_its_own_role() {
    let app = TestApp::new();
    let org = app.register_org("clinic@test.com", "Clinic").await;
    app.post_json(
        "/auth/register",
        json!({
            "account_type": "admin",
            "email": "root@test.com",
            "password": "abc$1234",
            "name": "Root",
        }),
    )
    .await;
    app.post_json(
        "/auth/register",
        json!({
            "account_type": "org_member",
            "email": "doc@test.com",
            "password": "abc$1234",
            "username": "doc",
            "full_name": "Doc",
            "organization_id": org["account"]["id"],
            "role": "doctor",
        }),
    )
    .await;

    let org_login = app.login("organization", "clinic@test.com", "abc$1234").await;
    assert_eq!(org_login["role"], "org_admin");

    let admin_login = app.login("admin", "root@test.com", "abc$1234").await;
    assert_eq!(admin_login["role"], "admin");

    let member_login = app.login("org_member", "doc@test.com", "abc$1234").await;
    assert_eq!(member_login["role"], "doctor");
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_are_indistinguishable() {
    let app = TestApp::new();
    app.register_user("jane@test.com", "jane").await;

    let wrong_password = app
        .post_json(
            "/auth/login",
            json!({
                "email": "jane@test.com",
                "password": "wrong$1234",
            }),
        )
        .await;
    let unknown_email = app
        .post_json(
            "/auth/login",
            json!({
                "email": "ghost@test.com",
                "password": "abc$1234",
            }),
        )
        .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    let body_a = body_json(wrong_password).await;
    let body_b = body_json(unknown_email).await;
    assert_eq!(body_a, body_b);
    assert_eq!(body_a["error"], "Invalid email or password");
}

#[tokio::test]
async fn test_login_context_scopes_the_lookup() {
    let app = TestApp::new();
    app.register_org("clinic@test.com", "Clinic").await;

    // The account exists, but not in the user table
    let response = app
        .post_json(
            "/auth/login",
            json!({
                "email": "clinic@test.com",
                "password": "abc$1234",
                "login_context": "user",
            }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_member_login_finds_the_oldest_membership() {
    let app = TestApp::new();
    let org_a = app.register_org("a@test.com", "Org A").await;
    let org_b = app.register_org("b@test.com", "Org B").await;

    for (org, role) in [(&org_a, "doctor"), (&org_b, "nurse")] {
        let response = app
            .post_json(
                "/auth/register",
                json!({
                    "account_type": "org_member",
                    "email": "worker@test.com",
                    "password": "abc$1234",
                    "username": "worker",
                    "full_name": "Worker",
                    "organization_id": org["account"]["id"],
                    "role": role,
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let body = app.login("org_member", "worker@test.com", "abc$1234").await;
    assert_eq!(body["role"], "doctor");
    assert_eq!(body["account"]["organization_id"], org_a["account"]["id"]);
}

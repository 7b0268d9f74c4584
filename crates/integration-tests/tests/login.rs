//! Login protocol end to end.

#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde_json::{Value, json};

use shopkart_core::{ErrorType, RegisterRequest, Role};
use shopkart_integration_tests::{PASSWORD, TestContext};
use shopkart_server::config::LoginErrorDetail;

async fn post_login(ctx: &TestContext, body: Value) -> (StatusCode, Value) {
    let response = ctx
        .http
        .post(ctx.url("/api/v1/auth/login"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_unknown_user_is_rejected() {
    let ctx = TestContext::new().await;

    let err = ctx.api.login("a@x.com", "secret123").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(err.error_type(), Some(ErrorType::InvalidUser));
    assert_eq!(err.server_message(), Some("User Not Registered!"));
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let ctx = TestContext::new().await;
    ctx.create_user("a@x.com", Role::Customer).await;

    let err = ctx.api.login("a@x.com", "wrong-password").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(err.error_type(), Some(ErrorType::InvalidPassword));

    let (_, body) = post_login(
        &ctx,
        json!({ "email": "a@x.com", "password": "wrong-password" }),
    )
    .await;
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn test_correct_credentials_yield_session() {
    let ctx = TestContext::new().await;
    let id = ctx.create_user("a@x.com", Role::Customer).await;

    let session = ctx.api.login("a@x.com", PASSWORD).await.unwrap();
    assert_eq!(session.user().id, id);
    assert_eq!(session.role(), Role::Customer);
    assert!(!session.is_expired());

    // Expiry is embedded in the token and is seven days out.
    let drift = (session.expires_at() - (Utc::now() + Duration::days(7))).abs();
    assert!(drift < Duration::seconds(5), "expiry off by {drift}");

    // The server accepts the token it issued.
    let claims = ctx
        .state
        .issuer()
        .validate(session.token().expose_secret())
        .unwrap();
    assert_eq!(claims.sub, id);
}

#[tokio::test]
async fn test_public_user_has_no_password_hash() {
    let ctx = TestContext::new().await;
    ctx.create_user("a@x.com", Role::Admin).await;

    let (status, body) =
        post_login(&ctx, json!({ "email": "a@x.com", "password": PASSWORD })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "admin");
    assert!(!body["token"].as_str().unwrap().is_empty());

    let user = body["user"].as_object().unwrap();
    assert!(user.keys().all(|k| !k.contains("password")));
}

#[tokio::test]
async fn test_missing_credentials() {
    let ctx = TestContext::new().await;

    for body in [json!({}), json!({ "email": "a@x.com" }), json!({ "password": "x" })] {
        let (status, body) = post_login(&ctx, body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["errorType"], "invalidCredentials");
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn test_generic_mode_merges_failure_kinds() {
    let ctx = TestContext::with_login_errors(LoginErrorDetail::Generic).await;
    ctx.create_user("a@x.com", Role::Customer).await;

    let unknown = ctx.api.login("b@x.com", PASSWORD).await.unwrap_err();
    let wrong = ctx.api.login("a@x.com", "wrong-password").await.unwrap_err();

    for err in [&unknown, &wrong] {
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(err.error_type(), Some(ErrorType::InvalidCredentials));
    }
    assert_eq!(unknown.server_message(), wrong.server_message());
}

#[tokio::test]
async fn test_register_then_login() {
    let ctx = TestContext::new().await;
    let request = RegisterRequest {
        name: "Ada".to_string(),
        email: "ada@x.com".to_string(),
        password: "long-enough".to_string(),
        phone: None,
        address: Some("1 Analytical Way".to_string()),
    };

    let user = ctx.api.register(&request).await.unwrap();
    assert_eq!(user.role, Role::Customer);
    assert_eq!(user.address.as_deref(), Some("1 Analytical Way"));

    let err = ctx.api.register(&request).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::CONFLICT));

    let session = ctx.api.login("ada@x.com", "long-enough").await.unwrap();
    assert_eq!(session.user().id, user.id);
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let ctx = TestContext::new().await;
    let err = ctx
        .api
        .register(&RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@x.com".to_string(),
            password: "short".to_string(),
            phone: None,
            address: None,
        })
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    assert_eq!(err.error_type(), Some(ErrorType::BadRequest));
}

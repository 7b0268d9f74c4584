//! Authentication (401) versus role authorization (403).

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::Value;

use shopkart_client::Dashboard;
use shopkart_core::{Email, ErrorType, Role, UpdateDetailsRequest};
use shopkart_integration_tests::TestContext;
use shopkart_server::db::UserStore;

async fn get(ctx: &TestContext, path: &str, authorization: Option<&str>) -> (StatusCode, Value) {
    let mut request = ctx.http.get(ctx.url(path));
    if let Some(value) = authorization {
        request = request.header(reqwest::header::AUTHORIZATION, value);
    }
    let response = request.send().await.unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_missing_or_invalid_token_is_unauthenticated() {
    let ctx = TestContext::new().await;

    for authorization in [None, Some("Bearer not-a-token"), Some("Bearer a.b.c")] {
        let (status, body) = get(&ctx, "/api/v1/user/wishlist", authorization).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{authorization:?}");
        assert_eq!(body["errorType"], "unauthenticated");
    }
}

#[tokio::test]
async fn test_token_signed_elsewhere_is_unauthenticated() {
    let ctx = TestContext::new().await;
    let other = TestContext::new().await;
    let id = ctx.create_user("a@x.com", Role::Customer).await;

    // Same user id, different signing key.
    let forged = other.state.issuer().issue(id).unwrap();
    let (status, _) = get(
        &ctx,
        "/api/v1/auth/user-auth",
        Some(&format!("Bearer {forged}")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_dashboards_follow_permission_table() {
    let ctx = TestContext::new().await;
    let customer = ctx.session("c@x.com", Role::Customer).await;
    let admin = ctx.session("a@x.com", Role::Admin).await;

    assert!(ctx.api.check_access(&customer, Dashboard::User).await.unwrap());
    assert!(!ctx.api.check_access(&customer, Dashboard::Admin).await.unwrap());
    assert!(ctx.api.check_access(&admin, Dashboard::Admin).await.unwrap());
    assert!(!ctx.api.check_access(&admin, Dashboard::User).await.unwrap());
}

#[tokio::test]
async fn test_forbidden_is_distinct_from_unauthenticated() {
    let ctx = TestContext::new().await;
    let admin = ctx.session("a@x.com", Role::Admin).await;

    let err = ctx.api.wishlist(&admin).await.unwrap_err();
    assert!(err.is_forbidden());
    assert!(!err.is_unauthenticated());
    assert_eq!(err.error_type(), Some(ErrorType::Forbidden));
}

#[tokio::test]
async fn test_role_change_applies_to_existing_session() {
    let ctx = TestContext::new().await;
    let session = ctx.session("c@x.com", Role::Customer).await;
    assert!(ctx.api.wishlist(&session).await.unwrap().is_empty());

    let email = Email::parse("c@x.com").unwrap();
    assert!(ctx.store.set_role(&email, Role::Admin).await.unwrap());

    // Same token, new role.
    assert!(ctx.api.wishlist(&session).await.unwrap_err().is_forbidden());
    assert!(
        ctx.api
            .check_access(&session, Dashboard::Admin)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_profile_update_uses_session_identity() {
    let ctx = TestContext::new().await;
    let mut session = ctx.session("c@x.com", Role::Customer).await;
    ctx.create_user("taken@x.com", Role::Customer).await;

    let user = ctx
        .api
        .update_details(
            &mut session,
            &UpdateDetailsRequest {
                new_name: Some("Grace".to_string()),
                new_email: None,
                new_phone: Some("555-0199".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(user.name, "Grace");
    assert_eq!(session.user().phone.as_deref(), Some("555-0199"));

    let err = ctx
        .api
        .update_details(
            &mut session,
            &UpdateDetailsRequest {
                new_email: Some("taken@x.com".to_string()),
                ..UpdateDetailsRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::CONFLICT));
    assert_eq!(session.user().email.as_str(), "c@x.com");
}

//! Optimistic wishlist against the real server.

#![allow(clippy::unwrap_used)]

use shopkart_client::{OptimisticWishlist, ToggleError};
use shopkart_core::{Email, ProductId, Role, WishlistAction, WishlistUpdateRequest};
use shopkart_integration_tests::TestContext;
use shopkart_server::db::{UserStore, WishlistStore};

/// A catalog ID in the external catalog's native form.
fn p() -> ProductId {
    ProductId::parse("65f1c0ffee0ddba11a5e0042").unwrap()
}

#[tokio::test]
async fn test_customer_toggle_adds_absent_product() {
    let ctx = TestContext::new().await;
    let session = ctx.session("c@x.com", Role::Customer).await;
    let wishlist = OptimisticWishlist::new(ctx.api.clone());

    assert!(wishlist.toggle(&session, &p()).await.unwrap());
    assert!(wishlist.contains(&p()));
    assert_eq!(ctx.store.list(session.user().id).await.unwrap(), vec![p()]);
}

#[tokio::test]
async fn test_toggle_twice_returns_to_absent() {
    let ctx = TestContext::new().await;
    let session = ctx.session("c@x.com", Role::Customer).await;
    let wishlist = OptimisticWishlist::new(ctx.api.clone());

    assert!(wishlist.toggle(&session, &p()).await.unwrap());
    assert!(!wishlist.toggle(&session, &p()).await.unwrap());
    assert!(!wishlist.contains(&p()));
    assert!(ctx.store.list(session.user().id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_toggle_refused_by_server() {
    let ctx = TestContext::new().await;
    let admin = ctx.session("a@x.com", Role::Admin).await;

    let err = ctx
        .api
        .update_wishlist(
            &admin,
            WishlistUpdateRequest {
                product_id: p(),
                action: Some(WishlistAction::Add),
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_forbidden());
    assert_eq!(
        err.server_message(),
        Some("Admins are not allowed to add items to the wishlist")
    );
    assert!(ctx.store.list(admin.user().id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_toggle_refused_locally() {
    let ctx = TestContext::new().await;
    let admin = ctx.session("a@x.com", Role::Admin).await;
    let wishlist = OptimisticWishlist::new(ctx.api.clone());

    let err = wishlist.toggle(&admin, &p()).await.unwrap_err();
    assert!(matches!(err, ToggleError::Forbidden(_)));
    assert!(!wishlist.contains(&p()));
}

#[tokio::test]
async fn test_server_refusal_reverts_optimistic_state() {
    let ctx = TestContext::new().await;
    let session = ctx.session("c@x.com", Role::Customer).await;
    let wishlist = OptimisticWishlist::new(ctx.api.clone());

    // Demoted server-side after login: the client still thinks "customer".
    let email = Email::parse("c@x.com").unwrap();
    ctx.store.set_role(&email, Role::Admin).await.unwrap();

    let err = wishlist.toggle(&session, &p()).await.unwrap_err();
    assert_eq!(
        err,
        ToggleError::Forbidden("Admins are not allowed to add items to the wishlist".to_string())
    );
    assert!(!wishlist.contains(&p()));
    assert!(!wishlist.is_pending(&p()));
}

#[tokio::test]
async fn test_resync_loads_server_state() {
    let ctx = TestContext::new().await;
    let session = ctx.session("c@x.com", Role::Customer).await;
    let id = session.user().id;
    let first = ProductId::parse("sku-1").unwrap();
    let second = ProductId::parse("sku-2").unwrap();
    ctx.store.add(id, &first).await.unwrap();
    ctx.store.add(id, &second).await.unwrap();

    let wishlist = OptimisticWishlist::new(ctx.api.clone());
    wishlist.resync(&session).await.unwrap();
    assert_eq!(wishlist.snapshot(), vec![first.clone(), second.clone()]);

    // Removing a present product sends an explicit remove.
    assert!(!wishlist.toggle(&session, &first).await.unwrap());
    assert_eq!(ctx.store.list(id).await.unwrap(), vec![second]);
}

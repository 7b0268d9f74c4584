//! Wishlist route handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use shopkart_core::{
    WishlistAction, WishlistResponse, WishlistUpdateRequest, WishlistUpdateResponse,
};

use crate::db::Store;
use crate::error::Result;
use crate::middleware::Authorized;
use crate::middleware::auth::{EditWishlist, ReadWishlist};
use crate::state::AppState;

/// `GET /api/v1/user/wishlist`
pub async fn wishlist<S: Store>(
    Authorized { auth, .. }: Authorized<ReadWishlist>,
    State(state): State<AppState<S>>,
) -> Result<Json<WishlistResponse>> {
    let wishlist_items = state.store().list(auth.user_id).await?;

    Ok(Json(WishlistResponse {
        success: true,
        wishlist_items,
    }))
}

/// `POST /api/v1/user/update-wishlist`
///
/// `type: "add"` and `type: "remove"` are idempotent; without `type` the
/// membership is flipped in one atomic store operation.
#[tracing::instrument(skip_all, fields(product_id))]
pub async fn update_wishlist<S: Store>(
    Authorized { auth, .. }: Authorized<EditWishlist>,
    State(state): State<AppState<S>>,
    payload: std::result::Result<Json<WishlistUpdateRequest>, JsonRejection>,
) -> Result<Json<WishlistUpdateResponse>> {
    let Json(request) = payload?;
    tracing::Span::current().record("product_id", request.product_id.as_str());

    let store = state.store();
    let in_wishlist = match request.action {
        Some(WishlistAction::Add) => {
            store.add(auth.user_id, &request.product_id).await?;
            true
        }
        Some(WishlistAction::Remove) => {
            store.remove(auth.user_id, &request.product_id).await?;
            false
        }
        None => store.toggle(auth.user_id, &request.product_id).await?,
    };

    tracing::debug!(user_id = %auth.user_id, in_wishlist, "wishlist updated");

    let message = if in_wishlist {
        "Added to wishlist"
    } else {
        "Removed from wishlist"
    };
    Ok(Json(WishlistUpdateResponse {
        success: true,
        message: message.to_string(),
        product_id: request.product_id,
        in_wishlist,
    }))
}

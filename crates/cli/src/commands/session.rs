//! Client commands: log in, log out and use the wishlist over the REST API.
//!
//! The session token lives in a local file (see
//! [`FileTokenStore::default_path`]). Logging out deletes it; the server is
//! not contacted.
//!
//! # Environment Variables
//!
//! - `SHOPKART_SERVER_URL` - server base URL (default `http://localhost:5000`)
//! - `SHOPKART_TOKEN_FILE` - where the session token is stored
//! - `SHOPKART_PASSWORD` - password for `login` when `-p` is omitted

use thiserror::Error;

use shopkart_client::{
    ApiClient, ClientError, FileTokenStore, OptimisticWishlist, SessionContext, ToggleError,
};
use shopkart_core::{Action, ProductId};

use super::output;

/// Errors from client commands.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No stored session, or it expired.
    #[error("Not logged in. Run `shopkart login` first.")]
    NotLoggedIn,

    /// Request failed.
    #[error("{}", describe(.0))]
    Client(#[from] ClientError),

    /// Wishlist toggle was refused or reverted.
    #[error("{}", .0.user_message())]
    Toggle(#[from] ToggleError),
}

/// The server's own message when it sent one.
fn describe(err: &ClientError) -> String {
    err.server_message().map_or_else(|| err.to_string(), str::to_string)
}

fn token_store() -> FileTokenStore {
    FileTokenStore::new(FileTokenStore::default_path())
}

async fn current_session() -> Result<SessionContext, SessionError> {
    token_store()
        .load()
        .await?
        .ok_or(SessionError::NotLoggedIn)
}

/// The server no longer accepts the stored token; drop it.
async fn forget_if_rejected(rejected: bool) -> Result<(), SessionError> {
    if rejected {
        tracing::warn!("Server rejected the stored session; discarding it");
        token_store().clear().await?;
    }
    Ok(())
}

/// Log in and store the session.
///
/// # Errors
///
/// Returns the server's message if the credentials are refused.
pub async fn login(server: &str, email: &str, password: &str) -> Result<(), SessionError> {
    let api = ApiClient::new(server)?;
    let session = api.login(email, password).await?;

    let store = token_store();
    store.save(&session).await?;

    tracing::debug!(path = %store.path().display(), "Session stored");
    output(format_args!(
        "Logged in as {} ({}), session valid until {}",
        session.user().name,
        session.role(),
        session.expires_at().format("%Y-%m-%d %H:%M UTC")
    ));
    Ok(())
}

/// Forget the stored session.
///
/// # Errors
///
/// Returns an error if the token file exists but cannot be removed.
pub async fn logout() -> Result<(), SessionError> {
    token_store().clear().await?;
    output("Logged out");
    Ok(())
}

/// Show the stored session.
///
/// # Errors
///
/// Returns an error if the token file cannot be read.
pub async fn whoami() -> Result<(), SessionError> {
    match token_store().load().await? {
        Some(session) => output(format_args!(
            "{} <{}> ({}), session valid until {}",
            session.user().name,
            session.user().email,
            session.role(),
            session.expires_at().format("%Y-%m-%d %H:%M UTC")
        )),
        None => output("Not logged in"),
    }
    Ok(())
}

/// Print the server's wishlist.
///
/// # Errors
///
/// Returns an error if there is no session or the server refuses.
pub async fn list_wishlist(server: &str) -> Result<(), SessionError> {
    let session = current_session().await?;
    let api = ApiClient::new(server)?;

    let items = match api.wishlist(&session).await {
        Ok(items) => items,
        Err(e) => {
            forget_if_rejected(e.is_unauthenticated()).await?;
            return Err(e.into());
        }
    };

    if items.is_empty() {
        output("Wishlist is empty");
    }
    for product in items {
        output(product);
    }
    Ok(())
}

/// Toggle `product` on the wishlist.
///
/// # Errors
///
/// Returns the classified failure; the wishlist is unchanged in that case.
pub async fn toggle_wishlist(server: &str, product: &ProductId) -> Result<(), SessionError> {
    let session = current_session().await?;
    let wishlist = OptimisticWishlist::new(ApiClient::new(server)?);

    // Roles that cannot see a wishlist are refused by `toggle` without a request.
    let result = async {
        if session.can(Action::ViewWishlist) {
            wishlist.resync(&session).await?;
        }
        wishlist.toggle(&session, product).await
    }
    .await;

    match result {
        Ok(true) => output(format_args!("Added {product} to wishlist")),
        Ok(false) => output(format_args!("Removed {product} from wishlist")),
        Err(e) => {
            forget_if_rejected(e == ToggleError::Unauthenticated).await?;
            return Err(e.into());
        }
    }
    Ok(())
}

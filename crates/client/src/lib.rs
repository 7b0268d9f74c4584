//! Shopkart client library.
//!
//! - [`ApiClient`] - typed calls against the REST API
//! - [`SessionContext`] - the logged-in identity, passed explicitly to every
//!   authenticated call and persisted through a [`FileTokenStore`]
//! - [`OptimisticWishlist`] - wishlist toggles applied locally first and
//!   reconciled with the server's answer
//!
//! # Example
//!
//! ```rust,ignore
//! let api = ApiClient::new("http://localhost:5000")?;
//! let store = FileTokenStore::new(FileTokenStore::default_path());
//!
//! let session = match store.load().await? {
//!     Some(session) => session,
//!     None => {
//!         let session = api.login("a@x.com", "secret123").await?;
//!         store.save(&session).await?;
//!         session
//!     }
//! };
//!
//! let wishlist = OptimisticWishlist::new(api.clone());
//! wishlist.resync(&session).await?;
//! wishlist.toggle(&session, &ProductId::parse("65f1c0ffee0ddba11a5e0042")?).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod error;
pub mod session;
pub mod wishlist;

pub use api::{ApiClient, Dashboard};
pub use error::ClientError;
pub use session::{FileTokenStore, SessionContext};
pub use wishlist::{OptimisticWishlist, PendingToggle, ToggleError, Wishlist, WishlistRemote};

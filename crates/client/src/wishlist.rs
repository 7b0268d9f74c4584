//! Optimistic wishlist.
//!
//! A toggle is a two-phase change against local state:
//!
//! 1. **Prepare** - [`Wishlist::begin_toggle`] flips membership immediately
//!    and marks the product as in flight. The returned [`PendingToggle`]
//!    remembers the pre-toggle membership.
//! 2. **Resolve** - once the server answers, either [`Wishlist::commit`]
//!    records the server's confirmed membership, or [`Wishlist::rollback`]
//!    applies the compensating change and restores the pre-toggle state.
//!
//! Only one toggle per product may be in flight. A second one is refused with
//! [`ToggleError::InFlight`] until the first resolves; a resync in between
//! does not release the claim.
//!
//! [`OptimisticWishlist`] drives that cycle against a [`WishlistRemote`]
//! (normally the [`ApiClient`]).

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use shopkart_core::{
    Action, ProductId, WishlistAction, WishlistUpdateRequest, WishlistUpdateResponse,
};

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::session::SessionContext;

const TRANSIENT_MESSAGE: &str = "Something went wrong! Please try again later.";

/// Why a toggle did not go through. Local state is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToggleError {
    /// A toggle for this product is still waiting on the server.
    #[error("a change to product {0} is already in progress")]
    InFlight(ProductId),

    /// The session's role may not change the wishlist.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// No valid session; the user has to log in again.
    #[error("not logged in")]
    Unauthenticated,

    /// Network or server failure. Retrying may help.
    #[error("wishlist update failed: {0}")]
    Transient(String),
}

impl ToggleError {
    /// Message to show the user.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::InFlight(_) => "Please wait for your previous change to finish.",
            Self::Forbidden(message) => message,
            Self::Unauthenticated => "Please log in to manage your wishlist.",
            Self::Transient(_) => TRANSIENT_MESSAGE,
        }
    }

    /// Whether retrying the same toggle later may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::InFlight(_) | Self::Transient(_))
    }
}

impl From<ClientError> for ToggleError {
    fn from(err: ClientError) -> Self {
        if err.is_forbidden() {
            let message = err
                .server_message()
                .unwrap_or(Action::UpdateWishlist.denial_message());
            Self::Forbidden(message.to_string())
        } else if err.is_unauthenticated() {
            Self::Unauthenticated
        } else {
            Self::Transient(err.to_string())
        }
    }
}

/// A prepared toggle awaiting the server's answer.
#[derive(Debug)]
#[must_use = "a pending toggle must be committed or rolled back"]
pub struct PendingToggle {
    product: ProductId,
    was_present: bool,
}

impl PendingToggle {
    /// The product being toggled.
    pub const fn product(&self) -> &ProductId {
        &self.product
    }

    /// Whether the product was in the wishlist before the toggle.
    pub const fn was_present(&self) -> bool {
        self.was_present
    }

    /// What the toggle asks the server to do.
    pub const fn action(&self) -> WishlistAction {
        if self.was_present {
            WishlistAction::Remove
        } else {
            WishlistAction::Add
        }
    }

    /// The request that carries this toggle.
    ///
    /// The action is explicit, so a retried request cannot flip the server
    /// back.
    pub fn request(&self) -> WishlistUpdateRequest {
        WishlistUpdateRequest {
            product_id: self.product.clone(),
            action: Some(self.action()),
        }
    }
}

/// Bookkeeping for one unresolved toggle.
#[derive(Debug, Clone, Copy)]
struct Flight {
    /// Membership the request asks for.
    target: bool,
    /// Membership to restore on rollback.
    baseline: bool,
}

/// Local wishlist state.
#[derive(Debug, Clone, Default)]
pub struct Wishlist {
    items: BTreeSet<ProductId>,
    in_flight: BTreeMap<ProductId, Flight>,
}

impl Wishlist {
    /// Empty wishlist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wishlist holding `items`, as last reported by the server.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = ProductId>) -> Self {
        Self {
            items: items.into_iter().collect(),
            in_flight: BTreeMap::new(),
        }
    }

    /// Whether `product` is (optimistically) in the wishlist.
    #[must_use]
    pub fn contains(&self, product: &ProductId) -> bool {
        self.items.contains(product)
    }

    /// Current membership, in product order.
    pub fn items(&self) -> impl Iterator<Item = &ProductId> + '_ {
        self.items.iter()
    }

    /// Whether a toggle for `product` awaits the server.
    #[must_use]
    pub fn is_pending(&self, product: &ProductId) -> bool {
        self.in_flight.contains_key(product)
    }

    /// Flip `product` locally and mark it in flight.
    ///
    /// # Errors
    ///
    /// Returns `ToggleError::InFlight` if a toggle for `product` has not
    /// resolved yet. Local state is untouched in that case.
    pub fn begin_toggle(&mut self, product: &ProductId) -> Result<PendingToggle, ToggleError> {
        if self.in_flight.contains_key(product) {
            return Err(ToggleError::InFlight(product.clone()));
        }

        let was_present = self.items.contains(product);
        self.in_flight.insert(
            product.clone(),
            Flight {
                target: !was_present,
                baseline: was_present,
            },
        );
        self.set(product, !was_present);

        Ok(PendingToggle {
            product: product.clone(),
            was_present,
        })
    }

    /// Settle `pending` with the membership the server confirmed.
    ///
    /// Returns the resulting membership.
    pub fn commit(&mut self, pending: PendingToggle, confirmed: bool) -> bool {
        self.in_flight.remove(&pending.product);
        self.set(&pending.product, confirmed);
        confirmed
    }

    /// Undo `pending`, restoring the membership it replaced.
    ///
    /// After a [`replace`](Self::replace) that is the server's membership
    /// from the replacing set, not the one seen when the toggle began.
    pub fn rollback(&mut self, pending: PendingToggle) {
        if let Some(flight) = self.in_flight.remove(&pending.product) {
            self.set(&pending.product, flight.baseline);
        }
    }

    /// Overwrite local state with the server's set.
    ///
    /// Toggles still in flight stay in flight and keep showing their
    /// requested membership on top of the new set.
    pub fn replace(&mut self, items: impl IntoIterator<Item = ProductId>) {
        self.items = items.into_iter().collect();
        for (product, flight) in &mut self.in_flight {
            flight.baseline = self.items.contains(product);
            if flight.target {
                self.items.insert(product.clone());
            } else {
                self.items.remove(product);
            }
        }
    }

    fn set(&mut self, product: &ProductId, present: bool) {
        if present {
            self.items.insert(product.clone());
        } else {
            self.items.remove(product);
        }
    }
}

/// Server side of the wishlist.
pub trait WishlistRemote: Send + Sync {
    /// Apply one change on the server.
    fn update(
        &self,
        session: &SessionContext,
        request: WishlistUpdateRequest,
    ) -> impl Future<Output = Result<WishlistUpdateResponse, ClientError>> + Send;

    /// The server's current set.
    fn fetch(
        &self,
        session: &SessionContext,
    ) -> impl Future<Output = Result<Vec<ProductId>, ClientError>> + Send;
}

impl WishlistRemote for ApiClient {
    async fn update(
        &self,
        session: &SessionContext,
        request: WishlistUpdateRequest,
    ) -> Result<WishlistUpdateResponse, ClientError> {
        self.update_wishlist(session, request).await
    }

    async fn fetch(&self, session: &SessionContext) -> Result<Vec<ProductId>, ClientError> {
        self.wishlist(session).await
    }
}

fn lock(state: &Mutex<Wishlist>) -> MutexGuard<'_, Wishlist> {
    // Every critical section is one set operation; a poisoned lock still
    // guards consistent state.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns a [`PendingToggle`] for the duration of the request.
///
/// Dropping it unresolved (the `toggle` future was cancelled) rolls the
/// toggle back.
struct FlightGuard<'a> {
    state: &'a Mutex<Wishlist>,
    pending: Option<PendingToggle>,
}

impl FlightGuard<'_> {
    fn commit(mut self, confirmed: bool) -> bool {
        self.pending
            .take()
            .is_some_and(|pending| lock(self.state).commit(pending, confirmed))
    }

    fn rollback(mut self) {
        if let Some(pending) = self.pending.take() {
            lock(self.state).rollback(pending);
        }
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!(product = %pending.product, "wishlist toggle cancelled; reverting");
            lock(self.state).rollback(pending);
        }
    }
}

/// A wishlist whose toggles show up locally before the server confirms them.
///
/// The lock guarding local state is never held across a server call, so
/// readers see the optimistic state while a request is in flight.
#[derive(Debug)]
pub struct OptimisticWishlist<R> {
    remote: R,
    state: Mutex<Wishlist>,
}

impl<R: WishlistRemote> OptimisticWishlist<R> {
    /// Empty wishlist backed by `remote`. Call [`resync`](Self::resync) to load it.
    pub fn new(remote: R) -> Self {
        Self {
            remote,
            state: Mutex::new(Wishlist::new()),
        }
    }

    /// Toggle `product` and return its membership once the server has answered.
    ///
    /// Sessions whose role may not change the wishlist are refused before any
    /// request is sent. Dropping the returned future before it completes
    /// reverts the optimistic change.
    ///
    /// # Errors
    ///
    /// Returns a [`ToggleError`]; local state is back to its pre-toggle value.
    #[tracing::instrument(skip(self, session), fields(user_id = %session.user().id))]
    pub async fn toggle(
        &self,
        session: &SessionContext,
        product: &ProductId,
    ) -> Result<bool, ToggleError> {
        let action = Action::UpdateWishlist;
        if !session.can(action) {
            return Err(ToggleError::Forbidden(action.denial_message().to_string()));
        }
        if session.is_expired() {
            return Err(ToggleError::Unauthenticated);
        }

        let pending = lock(&self.state).begin_toggle(product)?;
        let request = pending.request();
        let guard = FlightGuard {
            state: &self.state,
            pending: Some(pending),
        };

        match self.remote.update(session, request).await {
            Ok(response) => {
                let present = guard.commit(response.in_wishlist);
                tracing::debug!(present, "wishlist toggle confirmed");
                Ok(present)
            }
            Err(e) => {
                guard.rollback();
                let err = ToggleError::from(e);
                tracing::warn!(error = %err, "wishlist toggle reverted");
                Err(err)
            }
        }
    }

    /// Replace local state with the server's set.
    ///
    /// Toggles in flight keep their optimistic value and their claim on the
    /// product.
    ///
    /// # Errors
    ///
    /// Returns a [`ToggleError`] if the server cannot be read; local state is
    /// left as it was.
    pub async fn resync(&self, session: &SessionContext) -> Result<(), ToggleError> {
        let items = self.remote.fetch(session).await?;
        lock(&self.state).replace(items);
        Ok(())
    }

    /// Whether `product` is (optimistically) in the wishlist.
    #[must_use]
    pub fn contains(&self, product: &ProductId) -> bool {
        lock(&self.state).contains(product)
    }

    /// Whether a toggle for `product` awaits the server.
    #[must_use]
    pub fn is_pending(&self, product: &ProductId) -> bool {
        lock(&self.state).is_pending(product)
    }

    /// Current membership.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ProductId> {
        lock(&self.state).items().cloned().collect()
    }
}

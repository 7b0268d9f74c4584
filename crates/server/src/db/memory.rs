//! In-memory [`Store`] implementation.
//!
//! Backs the test suites and lets the router run without `PostgreSQL`.
//! A single `RwLock` guards all state, so each trait method is atomic with
//! respect to every other one, matching what [`PgStore`](super::PgStore)
//! gets from its statements and row locks.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use shopkart_core::{Email, ProductId, Role, UserId};

use super::{RepositoryError, Store, UserStore, WishlistStore};
use crate::models::{NewUser, ProfileUpdate, User};

/// In-memory store. Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i32,
    users: BTreeMap<UserId, (User, String)>,
    wishlists: BTreeMap<UserId, BTreeSet<ProductId>>,
}

impl Inner {
    fn email_taken(&self, email: &Email, except: Option<UserId>) -> bool {
        self.users
            .iter()
            .any(|(id, (user, _))| &user.email == email && Some(*id) != except)
    }
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for MemoryStore {
    async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|(user, _)| &user.email == email)
            .cloned())
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).map(|(user, _)| user.clone()))
    }

    async fn create(&self, new: &NewUser) -> Result<User, RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.email_taken(&new.email, None) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        inner.next_id += 1;
        let now = Utc::now();
        let user = User {
            id: UserId::new(inner.next_id),
            name: new.name.clone(),
            email: new.email.clone(),
            phone: new.phone.clone(),
            address: new.address.clone(),
            role: new.role,
            created_at: now,
            updated_at: now,
        };
        inner
            .users
            .insert(user.id, (user.clone(), new.password_hash.clone()));

        Ok(user)
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, RepositoryError> {
        let mut inner = self.inner.write().await;
        if let Some(email) = &update.email
            && inner.email_taken(email, Some(id))
        {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let Some((user, _)) = inner.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &update.name {
            user.name.clone_from(name);
        }
        if let Some(email) = &update.email {
            user.email = email.clone();
        }
        if let Some(phone) = &update.phone {
            user.phone = Some(phone.clone());
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn set_role(&self, email: &Email, role: Role) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.write().await;
        let Some((user, _)) = inner.users.values_mut().find(|(u, _)| &u.email == email) else {
            return Ok(false);
        };
        user.role = role;
        user.updated_at = Utc::now();
        Ok(true)
    }
}

impl WishlistStore for MemoryStore {
    async fn list(&self, user: UserId) -> Result<Vec<ProductId>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .wishlists
            .get(&user)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn add(&self, user: UserId, product: &ProductId) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.write().await;
        Ok(inner.wishlists.entry(user).or_default().insert(product.clone()))
    }

    async fn remove(&self, user: UserId, product: &ProductId) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .wishlists
            .get_mut(&user)
            .is_some_and(|set| set.remove(product)))
    }

    async fn toggle(&self, user: UserId, product: &ProductId) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.write().await;
        let set = inner.wishlists.entry(user).or_default();
        if set.remove(product) {
            Ok(false)
        } else {
            set.insert(product.clone());
            Ok(true)
        }
    }
}

impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Test".to_owned(),
            email: Email::parse(email).unwrap(),
            password_hash: "hash".to_owned(),
            phone: None,
            address: None,
            role: Role::Customer,
        }
    }

    #[tokio::test]
    async fn test_create_enforces_unique_email() {
        let store = MemoryStore::new();
        store.create(&new_user("a@x.com")).await.unwrap();

        let err = store.create(&new_user("A@X.com")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_credentials_lookup_returns_hash() {
        let store = MemoryStore::new();
        let created = store.create(&new_user("a@x.com")).await.unwrap();

        let (user, hash) = store
            .get_credentials(&Email::parse("a@x.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user, created);
        assert_eq!(hash, "hash");
    }

    #[tokio::test]
    async fn test_toggle_twice_returns_to_absent() {
        let store = MemoryStore::new();
        let user = UserId::new(1);
        let product = ProductId::parse("p-10").unwrap();

        assert!(store.toggle(user, &product).await.unwrap());
        assert_eq!(store.list(user).await.unwrap(), vec![product.clone()]);
        assert!(!store.toggle(user, &product).await.unwrap());
        assert!(store.list(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_and_remove_have_set_semantics() {
        let store = MemoryStore::new();
        let user = UserId::new(1);
        let product = ProductId::parse("p-3").unwrap();

        assert!(store.add(user, &product).await.unwrap());
        assert!(!store.add(user, &product).await.unwrap());
        assert_eq!(store.list(user).await.unwrap().len(), 1);
        assert!(store.remove(user, &product).await.unwrap());
        assert!(!store.remove(user, &product).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_toggles_do_not_lose_updates() {
        let store = MemoryStore::new();
        let user = UserId::new(1);
        let product = ProductId::parse("p-1").unwrap();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let store = store.clone();
                let product = product.clone();
                tokio::spawn(async move { store.toggle(user, &product).await.unwrap() })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        // An even number of toggles leaves the product absent.
        assert!(store.list(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_profile_rejects_taken_email() {
        let store = MemoryStore::new();
        store.create(&new_user("a@x.com")).await.unwrap();
        let b = store.create(&new_user("b@x.com")).await.unwrap();

        let update = ProfileUpdate {
            email: Some(Email::parse("a@x.com").unwrap()),
            ..ProfileUpdate::default()
        };
        let err = store.update_profile(b.id, &update).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_set_role() {
        let store = MemoryStore::new();
        let user = store.create(&new_user("a@x.com")).await.unwrap();
        let email = Email::parse("a@x.com").unwrap();

        assert!(store.set_role(&email, Role::Admin).await.unwrap());
        assert_eq!(
            store.get_by_id(user.id).await.unwrap().unwrap().role,
            Role::Admin
        );
        assert!(
            !store
                .set_role(&Email::parse("nobody@x.com").unwrap(), Role::Admin)
                .await
                .unwrap()
        );
    }
}

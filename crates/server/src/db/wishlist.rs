//! `PostgreSQL` implementation of [`WishlistStore`].
//!
//! `add` and `remove` are single idempotent statements. `toggle` reads and
//! writes, so it runs in a transaction that first takes a row lock on the
//! owning user; concurrent toggles for one user queue behind that lock.

use shopkart_core::{ProductId, UserId};

use super::{PgStore, RepositoryError, WishlistStore};

impl WishlistStore for PgStore {
    async fn list(&self, user: UserId) -> Result<Vec<ProductId>, RepositoryError> {
        let items = sqlx::query_scalar::<_, ProductId>(
            "SELECT product_id FROM shop.wishlist_item WHERE user_id = $1 ORDER BY product_id",
        )
        .bind(user)
        .fetch_all(self.pool())
        .await?;

        Ok(items)
    }

    async fn add(&self, user: UserId, product: &ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO shop.wishlist_item (user_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, product_id) DO NOTHING
            ",
        )
        .bind(user)
        .bind(product)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn remove(&self, user: UserId, product: &ProductId) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM shop.wishlist_item WHERE user_id = $1 AND product_id = $2")
                .bind(user)
                .bind(product)
                .execute(self.pool())
                .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn toggle(&self, user: UserId, product: &ProductId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool().begin().await?;

        // NO KEY UPDATE leaves the foreign-key checks of plain `add` unblocked.
        sqlx::query("SELECT 1 FROM shop.user WHERE id = $1 FOR NO KEY UPDATE")
            .bind(user)
            .fetch_optional(&mut *tx)
            .await?;

        let removed =
            sqlx::query("DELETE FROM shop.wishlist_item WHERE user_id = $1 AND product_id = $2")
                .bind(user)
                .bind(product)
                .execute(&mut *tx)
                .await?
                .rows_affected()
                == 1;

        if !removed {
            // A concurrent `add` may win the insert; the product is present either way.
            sqlx::query(
                r"
                INSERT INTO shop.wishlist_item (user_id, product_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id, product_id) DO NOTHING
                ",
            )
            .bind(user)
            .bind(product)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(!removed)
    }
}

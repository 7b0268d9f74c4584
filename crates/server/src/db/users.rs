//! `PostgreSQL` implementation of [`UserStore`].
//!
//! Queries are runtime-checked (`query_as` + `FromRow`) so the crate builds
//! without a live database or an offline query cache.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use shopkart_core::{Email, Role, UserId};

use super::{PgStore, RepositoryError, UserStore, conflict_or_database};
use crate::models::{NewUser, ProfileUpdate, User};

/// Columns selected for a [`User`]. Kept in one place so every query agrees.
const USER_COLUMNS: &str = "id, name, email, phone, address, role, created_at, updated_at";

#[derive(FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: String,
    phone: Option<String>,
    address: Option<String>,
    role: Role,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            email,
            phone: row.phone,
            address: row.address,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl UserStore for PgStore {
    async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM shop.user WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool())
        .await?;

        match row {
            Some(r) => Ok(Some((User::try_from(r.user)?, r.password_hash))),
            None => Ok(None),
        }
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM shop.user WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            INSERT INTO shop.user (name, email, password_hash, phone, address, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(user.role)
        .fetch_one(self.pool())
        .await
        .map_err(|e| conflict_or_database(e, "email"))?;

        User::try_from(row)
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            UPDATE shop.user
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.phone)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| conflict_or_database(e, "email"))?;

        row.map(User::try_from).transpose()
    }

    async fn set_role(&self, email: &Email, role: Role) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.user SET role = $2, updated_at = now() WHERE email = $1",
        )
        .bind(email)
        .bind(role)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

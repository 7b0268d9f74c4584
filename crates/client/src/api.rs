//! Typed client for the Shopkart REST API.

use std::sync::Arc;

use reqwest::{RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use shopkart_core::{
    AccessResponse, ErrorBody, LoginRequest, LoginResponse, ProductId, PublicUser,
    RegisterRequest, UpdateDetailsRequest, UserResponse, WishlistResponse, WishlistUpdateRequest,
    WishlistUpdateResponse,
};

use crate::error::ClientError;
use crate::session::SessionContext;

/// Which dashboard to check access for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dashboard {
    User,
    Admin,
}

impl Dashboard {
    const fn path(self) -> &'static str {
        match self {
            Self::User => "api/v1/auth/user-auth",
            Self::Admin => "api/v1/auth/admin-auth",
        }
    }
}

/// Client for the Shopkart API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base: Url,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.inner.base.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the server at `base_url` (e.g. `http://localhost:5000`).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Url` if `base_url` is not a valid URL.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Like [`new`](Self::new), with a preconfigured `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Url` if `base_url` is not a valid URL.
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self, ClientError> {
        let mut base = Url::parse(base_url)?;
        // Url::join replaces the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(ApiClientInner { client, base }),
        })
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.inner.base.join(path)?)
    }

    fn get(&self, path: &str, session: &SessionContext) -> Result<RequestBuilder, ClientError> {
        Ok(authorize(self.inner.client.get(self.url(path)?), session))
    }

    fn post(&self, path: &str) -> Result<RequestBuilder, ClientError> {
        Ok(self.inner.client.post(self.url(path)?))
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Log in and build a session from the response.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with `errorType` `invalidCredentials`,
    /// `invalidUser` or `invalidPassword` when the login is refused.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionContext, ClientError> {
        let request = LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        };

        let response: LoginResponse =
            decode(self.post("api/v1/auth/login")?.json(&request).send().await?).await?;
        SessionContext::from_token(response.token, response.user)
    }

    /// Register a customer account.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 409 if the email is taken, or
    /// 400 if the input is invalid.
    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<PublicUser, ClientError> {
        let response: UserResponse =
            decode(self.post("api/v1/auth/register")?.json(request).send().await?).await?;
        Ok(response.user)
    }

    /// Ask the server whether this session may enter `dashboard`.
    ///
    /// Returns `Ok(false)` when the role is not permitted.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 401 if the session is invalid.
    pub async fn check_access(
        &self,
        session: &SessionContext,
        dashboard: Dashboard,
    ) -> Result<bool, ClientError> {
        match decode::<AccessResponse>(self.get(dashboard.path(), session)?.send().await?).await {
            Ok(access) => Ok(access.ok),
            Err(e) if e.is_forbidden() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Edit the session user's profile. Updates the cached user on success.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 409 if the new email is taken.
    pub async fn update_details(
        &self,
        session: &mut SessionContext,
        request: &UpdateDetailsRequest,
    ) -> Result<PublicUser, ClientError> {
        let builder = authorize(self.post("api/v1/auth/update-details")?, session);
        let response: UserResponse = decode(builder.json(request).send().await?).await?;

        session.set_user(response.user.clone());
        Ok(response.user)
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// The server's current wishlist for this session.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 403 for admin sessions.
    pub async fn wishlist(&self, session: &SessionContext) -> Result<Vec<ProductId>, ClientError> {
        let response: WishlistResponse =
            decode(self.get("api/v1/user/wishlist", session)?.send().await?).await?;
        Ok(response.wishlist_items)
    }

    /// Add, remove or toggle one product.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 403 for admin sessions and 401
    /// for an invalid session.
    #[instrument(skip(self, session))]
    pub async fn update_wishlist(
        &self,
        session: &SessionContext,
        request: WishlistUpdateRequest,
    ) -> Result<WishlistUpdateResponse, ClientError> {
        let builder = authorize(self.post("api/v1/user/update-wishlist")?, session);
        decode(builder.json(&request).send().await?).await
    }
}

fn authorize(builder: RequestBuilder, session: &SessionContext) -> RequestBuilder {
    builder.bearer_auth(session.token().expose_secret())
}

/// Turn a response into `T`, or into a classified error.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await?;
    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => {
            tracing::debug!(%status, error_type = ?body.error_type, "API error");
            Err(ClientError::Api { status, body })
        }
        Err(_) => {
            tracing::debug!(
                %status,
                body = %text.chars().take(200).collect::<String>(),
                "non-JSON error response"
            );
            Err(ClientError::UnexpectedStatus { status })
        }
    }
}

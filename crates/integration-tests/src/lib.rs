//! Integration tests for Shopkart.
//!
//! Each test starts the real application router on an ephemeral port, backed
//! by the in-memory store, and talks to it over HTTP through
//! `shopkart-client` or plain `reqwest`. No database or external service is
//! needed, except for the `#[ignore]`d `postgres` tests.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopkart-integration-tests
//!
//! # PgStore tests (scratch database, migrations applied automatically)
//! DATABASE_URL=postgres://localhost/shopkart_test \
//!     cargo test -p shopkart-integration-tests --test postgres -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `login` - Login protocol and registration
//! - `authorization` - Authentication vs. role gating
//! - `wishlist` - Optimistic wishlist against the server
//! - `postgres` - `PgStore` wishlist atomicity

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use secrecy::SecretString;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use shopkart_client::{ApiClient, SessionContext};
use shopkart_core::{Email, Role, UserId};
use shopkart_server::config::{LoginErrorDetail, ServerConfig};
use shopkart_server::db::UserStore;
use shopkart_server::db::memory::MemoryStore;
use shopkart_server::models::NewUser;
use shopkart_server::services::auth::hash_password;
use shopkart_server::state::AppState;

/// Password given to every user created through [`TestContext::create_user`].
pub const PASSWORD: &str = "secret123";

/// A running server plus handles to poke at it.
pub struct TestContext {
    /// The server's store, for seeding and for checking server-side state.
    pub store: MemoryStore,
    /// The server's shared state (signing key included).
    pub state: AppState<MemoryStore>,
    /// `http://127.0.0.1:<port>`.
    pub base_url: String,
    /// Client pointed at the server.
    pub api: ApiClient,
    /// Plain HTTP client for requests the typed client cannot express.
    pub http: reqwest::Client,
    server: JoinHandle<()>,
}

impl TestContext {
    /// Start a server that reports distinct login failure kinds.
    pub async fn new() -> Self {
        Self::with_login_errors(LoginErrorDetail::Detailed).await
    }

    /// Start a server with the given login failure disclosure.
    pub async fn with_login_errors(login_errors: LoginErrorDetail) -> Self {
        let store = MemoryStore::new();
        let state = AppState::new(config(login_errors), store.clone())
            .expect("Failed to build application state");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let app = shopkart_server::app(state.clone(), None);
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        let base_url = format!("http://{addr}");
        let api = ApiClient::new(&base_url).expect("Invalid base URL");

        Self {
            store,
            state,
            base_url,
            api,
            http: reqwest::Client::new(),
            server,
        }
    }

    /// Absolute URL for `path` (which starts with `/`).
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Insert a user with password [`PASSWORD`] directly into the store.
    pub async fn create_user(&self, email: &str, role: Role) -> UserId {
        self.store
            .create(&NewUser {
                name: "Test User".to_string(),
                email: Email::parse(email).expect("Invalid test email"),
                password_hash: hash_password(PASSWORD).expect("Failed to hash password"),
                phone: None,
                address: None,
                role,
            })
            .await
            .expect("Failed to create test user")
            .id
    }

    /// Create a user and log in as them.
    pub async fn session(&self, email: &str, role: Role) -> SessionContext {
        self.create_user(email, role).await;
        self.api
            .login(email, PASSWORD)
            .await
            .expect("Failed to log in test user")
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn config(login_errors: LoginErrorDetail) -> ServerConfig {
    ServerConfig {
        database_url: SecretString::from("postgres://localhost/unused"),
        host: [127, 0, 0, 1].into(),
        port: 0,
        session_secret: SecretString::from("integration-Kx9$wQ2!mR7@tB4#vN8&zL1*"),
        client_origin: None,
        login_errors,
        log_json: false,
        trusted_proxy: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

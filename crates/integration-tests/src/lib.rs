//! Integration test support for Market Stall.
//!
//! Two ways to drive the API:
//!
//! - [`TestApp`] sends requests straight into the router with
//!   `tower::ServiceExt::oneshot`, carrying the session cookie itself.
//! - [`TestServer`] serves the router on an ephemeral port for `reqwest`
//!   clients with a cookie store.
//!
//! Both use the demo catalog, a bootstrap admin ([`ADMIN_USERNAME`]) and
//! low-cost password hashing.

use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::Value;
use tokio::{net::TcpListener, task::JoinHandle};
use tower::ServiceExt;

use market_stall_api::config::{ApiConfig, BootstrapAdmin};
use market_stall_api::middleware::SESSION_COOKIE_NAME;
use market_stall_api::services::Argon2Hasher;
use market_stall_api::state::AppState;
use market_stall_api::store::Catalog;

/// Username of the seeded admin.
pub const ADMIN_USERNAME: &str = "root";
/// Password of the seeded admin.
pub const ADMIN_PASSWORD: &str = "Gq7#tK2!vRw9@pLx";

/// Default configuration plus a bootstrap admin.
#[must_use]
pub fn test_config() -> ApiConfig {
    ApiConfig {
        bootstrap_admin: Some(BootstrapAdmin {
            username: ADMIN_USERNAME.to_string(),
            password: SecretString::from(ADMIN_PASSWORD),
        }),
        ..ApiConfig::default()
    }
}

/// Application state with the demo catalog and the admin seeded.
///
/// # Panics
///
/// Panics if the admin cannot be seeded.
pub async fn test_state(config: ApiConfig) -> AppState {
    let state = AppState::new(config, Catalog::demo(), Argon2Hasher::low_cost());
    state
        .seed_bootstrap_admin()
        .await
        .expect("Failed to seed bootstrap admin");
    state
}

/// Response as seen by a test.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    /// JSON body, or the raw text as a JSON string when it is not JSON.
    pub body: Value,
    pub set_cookie: Option<String>,
}

/// In-process client bound to one session.
///
/// Clones share the session, which is how tests issue concurrent requests on
/// the same session. [`TestApp::new_session`] starts a second client against
/// the same application.
#[derive(Clone)]
pub struct TestApp {
    router: Router,
    cookie: Arc<Mutex<Option<String>>>,
}

impl TestApp {
    /// Fresh application with the test configuration.
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: ApiConfig) -> Self {
        Self {
            router: market_stall_api::app(test_state(config).await),
            cookie: Arc::default(),
        }
    }

    /// Another client of the same application, with no session yet.
    #[must_use]
    pub fn new_session(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: Arc::default(),
        }
    }

    /// The session cookie pair (`ms_session=...`) this client sends, if any.
    ///
    /// # Panics
    ///
    /// Panics if the cookie lock is poisoned.
    #[must_use]
    pub fn cookie(&self) -> Option<String> {
        self.cookie
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the session cookie this client sends.
    pub fn set_cookie(&self, cookie: Option<String>) {
        *self.cookie.lock().unwrap_or_else(PoisonError::into_inner) = cookie;
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> TestResponse {
        self.send(Method::POST, path, Some(body.to_string())).await
    }

    /// POST a raw body with a JSON content type.
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        self.send(Method::POST, path, Some(body.to_owned())).await
    }

    /// Log in, asserting success.
    ///
    /// # Panics
    ///
    /// Panics if the login is refused.
    pub async fn login(&self, username: &str, password: &str) {
        let response = self
            .post(
                "/login",
                &serde_json::json!({ "username": username, "password": password }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {response:?}");
    }

    /// Log in as the bootstrap admin.
    pub async fn login_admin(&self) {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
    }

    async fn send(&self, method: Method, path: &str, body: Option<String>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = self.cookie() {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body)),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        // Track the session cookie the way a browser would
        if let Some(value) = set_cookie
            .as_deref()
            .and_then(|c| c.split(';').next())
            .and_then(|pair| pair.strip_prefix(SESSION_COOKIE_NAME))
            .and_then(|rest| rest.strip_prefix('='))
        {
            let cookie = (!value.is_empty()).then(|| format!("{SESSION_COOKIE_NAME}={value}"));
            self.set_cookie(cookie);
        }

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            body,
            set_cookie,
        }
    }
}

/// The API served on an ephemeral local port.
pub struct TestServer {
    pub base_url: String,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Start a server with the test configuration.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn() -> Self {
        let state = test_state(test_config()).await;
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Listener has no address");

        let task = tokio::spawn(async move {
            axum::serve(listener, market_stall_api::app(state))
                .await
                .expect("Server error");
        });

        Self {
            base_url: format!("http://{addr}"),
            task,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// HTTP client that keeps cookies between requests, like a browser.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

//! Integration tests for Nexus.
//!
//! Each test starts its own server on an ephemeral port with the simulated
//! latencies switched off, then drives it over HTTP with `reqwest`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p nexus-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth_flow` - Sign-up, sign-in, guest entry, logout
//! - `uploads` - Admin uploads and the resource list
//! - `chat` - Domain-scoped chat replies
//! - `static_files` - The static file host

use std::net::SocketAddr;
use std::path::PathBuf;

use reqwest::{Client, redirect::Policy};
use tokio::task::JoinHandle;

use nexus_server::{AppState, LatencyConfig, ServerConfig};

/// A server running in the background for the lifetime of the value.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server over the real public directory with no latency.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let mut config =
            ServerConfig::with_public_dir(public_dir()).expect("default config is valid");
        config.latency = LatencyConfig::none();
        Self::with_config(config).await
    }

    /// Start a server with `config`. Host and port are ignored.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn with_config(config: ServerConfig) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("listener has an address");
        let app = nexus_server::app(AppState::new(config));

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self { addr, handle }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A browser-like client: keeps cookies and does not follow redirects, so
/// tests can assert on where a response points.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to build HTTP client")
}

/// The server crate's public directory.
#[must_use]
pub fn public_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../server/public")
}

/// The `Location` header of a redirect.
///
/// # Panics
///
/// Panics if the response is not a redirect.
#[must_use]
pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("response is a redirect")
        .to_string()
}

/// Sign up as a user locked to `domain`, or with general access when `None`.
/// Leaves the client signed in.
///
/// # Panics
///
/// Panics if the request fails.
pub async fn sign_up_user(server: &TestServer, client: &Client, email: &str, domain: Option<&str>) {
    let mut form = vec![
        ("email", email),
        ("password", "password123"),
        ("confirm_password", "password123"),
        ("role", "user"),
    ];
    match domain {
        Some(domain) => form.push(("domain", domain)),
        None => form.push(("general_access", "on")),
    }

    let response = client
        .post(server.url("/signup"))
        .form(&form)
        .send()
        .await
        .expect("sign-up request");
    assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);
}

/// Sign up as an admin. Leaves the client signed in.
///
/// # Panics
///
/// Panics if the request fails.
pub async fn sign_up_admin(server: &TestServer, client: &Client, email: &str) {
    let response = client
        .post(server.url("/signup"))
        .form(&[
            ("email", email),
            ("password", "password123"),
            ("confirm_password", "password123"),
            ("role", "admin"),
        ])
        .send()
        .await
        .expect("sign-up request");
    assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);
}

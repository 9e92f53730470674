//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional:
//! - `NEXUS_HOST` - Bind address (default: 127.0.0.1)
//! - `NEXUS_PORT` - Listen port (default: 3000)
//! - `NEXUS_BASE_URL` - Public URL; `https://` turns on secure cookies
//!   (default: <http://localhost:3000>)
//! - `NEXUS_PUBLIC_DIR` - Root of the static file host (default: crates/server/public)
//! - `NEXUS_DOMAINS` - Comma-separated sector names
//!   (default: Legal,Medical,Technology,Finance)
//! - `NEXUS_CHAT_DELAY_MS` - Minimum simulated chat latency (default: 1500)
//! - `NEXUS_CHAT_JITTER_MS` - Random extra chat latency window (default: 1000)
//! - `NEXUS_UPLOAD_DELAY_MS` - Simulated upload latency (default: 1000)
//! - `NEXUS_MAX_UPLOAD_BYTES` - Per-file upload ceiling (default: 10 MiB)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use nexus_core::DomainName;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_PUBLIC_DIR: &str = "crates/server/public";
const DEFAULT_DOMAINS: &str = "Legal,Medical,Technology,Finance";
const DEFAULT_CHAT_DELAY_MS: u64 = 1500;
const DEFAULT_CHAT_JITTER_MS: u64 = 1000;
const DEFAULT_UPLOAD_DELAY_MS: u64 = 1000;

/// Default per-file upload ceiling (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("No domains configured in {0}")]
    NoDomains(String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the service
    pub base_url: String,
    /// Root directory served by the static file host
    pub public_dir: PathBuf,
    /// Registered sectors, in display order
    pub domains: Vec<DomainName>,
    /// Simulated latencies
    pub latency: LatencyConfig,
    /// Largest accepted upload, per file
    pub max_upload_bytes: u64,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Simulated latencies standing in for real backend work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyConfig {
    /// Minimum delay before a chat response.
    pub chat_min: Duration,
    /// Upper bound (exclusive) of the random extra chat delay.
    pub chat_jitter: Duration,
    /// Fixed delay before an upload is recorded.
    pub upload: Duration,
}

impl LatencyConfig {
    /// No simulated latency at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            chat_min: Duration::ZERO,
            chat_jitter: Duration::ZERO,
            upload: Duration::ZERO,
        }
    }
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            chat_min: Duration::from_millis(DEFAULT_CHAT_DELAY_MS),
            chat_jitter: Duration::from_millis(DEFAULT_CHAT_JITTER_MS),
            upload: Duration::from_millis(DEFAULT_UPLOAD_DELAY_MS),
        }
    }
}

impl ServerConfig {
    /// Configuration with every default applied and the given static root.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` only if the built-in domain list is invalid.
    pub fn with_public_dir(public_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            base_url: DEFAULT_BASE_URL.to_string(),
            public_dir: public_dir.into(),
            domains: parse_domains("NEXUS_DOMAINS", DEFAULT_DOMAINS)?,
            latency: LatencyConfig::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            sentry_dsn: None,
            sentry_environment: None,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed, or if
    /// the domain list is empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("NEXUS_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?;
        let port = parse_env("NEXUS_PORT", DEFAULT_PORT)?;
        let base_url = get_env_or_default("NEXUS_BASE_URL", DEFAULT_BASE_URL);
        let public_dir = PathBuf::from(get_env_or_default("NEXUS_PUBLIC_DIR", DEFAULT_PUBLIC_DIR));
        let domains = parse_domains(
            "NEXUS_DOMAINS",
            &get_env_or_default("NEXUS_DOMAINS", DEFAULT_DOMAINS),
        )?;

        let latency = LatencyConfig {
            chat_min: Duration::from_millis(parse_env("NEXUS_CHAT_DELAY_MS", DEFAULT_CHAT_DELAY_MS)?),
            chat_jitter: Duration::from_millis(parse_env(
                "NEXUS_CHAT_JITTER_MS",
                DEFAULT_CHAT_JITTER_MS,
            )?),
            upload: Duration::from_millis(parse_env(
                "NEXUS_UPLOAD_DELAY_MS",
                DEFAULT_UPLOAD_DELAY_MS,
            )?),
        };
        let max_upload_bytes = parse_env("NEXUS_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;

        Ok(Self {
            host,
            port,
            base_url,
            public_dir,
            domains,
            latency,
            max_upload_bytes,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

/// Parse a comma-separated sector list, dropping blanks and case-insensitive
/// duplicates while keeping first-seen order.
fn parse_domains(key: &str, raw: &str) -> Result<Vec<DomainName>, ConfigError> {
    let mut domains: Vec<DomainName> = Vec::new();
    for part in raw.split(',').filter(|p| !p.trim().is_empty()) {
        let domain = DomainName::parse(part)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
        if !domains.iter().any(|d| d.matches(domain.as_str())) {
            domains.push(domain);
        }
    }
    if domains.is_empty() {
        return Err(ConfigError::NoDomains(key.to_string()));
    }
    Ok(domains)
}

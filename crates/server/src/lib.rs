//! Nexus server library.
//!
//! Sign-up and sign-in, the admin upload panel, the domain-scoped chat panel
//! and the static file host, exposed as a library so the binary and the
//! integration tests build the same router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use config::{LatencyConfig, ServerConfig};
pub use routes::app;
pub use state::AppState;

//! Nexus Core - Shared types library.
//!
//! This crate provides the domain types used by the Nexus chat service:
//! - `server` - Web service hosting the sign-in, admin and chat panels
//! - `integration-tests` - End-to-end tests against a live server
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage, no HTTP.
//! Everything here can be validated and tested without a runtime.
//!
//! # Modules
//!
//! - [`types`] - Emails, roles, sector names, access scopes and typed IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

//! Core types for Nexus.
//!
//! This module provides type-safe wrappers for the domain-scoped access model.

pub mod access;
pub mod email;
pub mod id;
pub mod role;

pub use access::{AccessScope, DomainError, DomainName};
pub use email::{Email, EmailError};
pub use id::*;
pub use role::{Role, RoleError};

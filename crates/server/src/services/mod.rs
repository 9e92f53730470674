//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Account registration, sign-in and the simulated password reset
//! - `chat` - Canned, scope-aware chat replies with simulated latency
//! - `domains` - Registry of sectors accounts and uploads may target
//! - `uploads` - Upload validation and the resource list

pub mod auth;
pub mod chat;
pub mod domains;
pub mod uploads;

pub use auth::{AuthError, AuthService, Registration};
pub use chat::{ChatError, ChatResponder};
pub use domains::DomainRegistry;
pub use uploads::{UploadError, UploadPolicy, UploadReport, UploadService};

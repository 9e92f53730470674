//! Uploaded resource metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nexus_core::{DomainName, FileId};

/// A file an admin uploaded into a sector.
///
/// Only metadata is kept; the bytes are discarded once validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Unique file ID.
    pub id: FileId,
    /// Original file name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type reported by the browser.
    #[serde(rename = "type")]
    pub content_type: String,
    /// Sector the file belongs to.
    pub domain: DomainName,
    /// When the upload finished.
    pub uploaded_at: DateTime<Utc>,
}

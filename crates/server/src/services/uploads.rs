//! Admin resource uploads.
//!
//! Uploads are simulated: each file is checked against the type allow-list
//! and the size ceiling, the bytes are dropped, and after a fixed delay the
//! metadata is recorded in the sector's resource list.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use nexus_core::{AccessScope, DomainName, FileId};

use crate::db::{FileRepository, MemoryDb, RepositoryError};
use crate::models::upload::UploadedFile;

/// MIME types an admin may upload: PDF, DOCX, Markdown, PNG, JPEG.
pub const ALLOWED_TYPES: &[&str] = &[
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/markdown",
    "image/png",
    "image/jpeg",
];

/// Errors that reject a whole upload request.
#[derive(Debug, Error)]
pub enum UploadError {
    /// No registered domain was chosen.
    #[error("Please select a domain before uploading files.")]
    DomainRequired,

    /// The request carried no files.
    #[error("No files were selected.")]
    NoFiles,

    /// The multipart body could not be read.
    #[error("Malformed upload: {0}")]
    Malformed(String),

    /// The file does not exist.
    #[error("File not found")]
    NotFound,
}

impl From<RepositoryError> for UploadError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound | RepositoryError::Conflict(_) => Self::NotFound,
        }
    }
}

/// Why a single file was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("File type not allowed: {name}. Please upload PDF, DOCX, MD, PNG, or JPG files.")]
    DisallowedType { name: String },

    #[error("File too large: {name}. Maximum size is {limit}.")]
    TooLarge { name: String, limit: String },
}

/// One file as read from the request. The bytes are already gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    pub name: String,
    pub content_type: String,
    /// Bytes read; reading stops one byte past the ceiling.
    pub size: u64,
}

/// A skipped file and the message explaining why.
#[derive(Debug, Clone, Serialize)]
pub struct RejectedFile {
    pub name: String,
    pub reason: String,
}

/// Outcome of an upload request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadReport {
    pub accepted: Vec<UploadedFile>,
    pub rejected: Vec<RejectedFile>,
}

/// Type and size rules for uploads.
#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    max_bytes: u64,
}

impl UploadPolicy {
    #[must_use]
    pub const fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Check one file. The type is checked before the size.
    ///
    /// # Errors
    ///
    /// Returns the rejection to report for this file.
    pub fn check(&self, candidate: &UploadCandidate) -> Result<(), UploadRejection> {
        let mime = candidate
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !ALLOWED_TYPES.contains(&mime.as_str()) {
            return Err(UploadRejection::DisallowedType {
                name: candidate.name.clone(),
            });
        }
        if candidate.size > self.max_bytes {
            return Err(UploadRejection::TooLarge {
                name: candidate.name.clone(),
                limit: format_limit(self.max_bytes),
            });
        }
        Ok(())
    }
}

/// Upload service over the in-memory file list.
pub struct UploadService<'a> {
    files: FileRepository<'a>,
    policy: UploadPolicy,
    delay: Duration,
}

impl<'a> UploadService<'a> {
    #[must_use]
    pub const fn new(db: &'a MemoryDb, policy: UploadPolicy, delay: Duration) -> Self {
        Self {
            files: FileRepository::new(db),
            policy,
            delay,
        }
    }

    /// Validate every candidate, wait out the simulated transfer, then record
    /// the accepted files under `domain`.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::NoFiles` if `candidates` is empty.
    pub async fn upload(
        &self,
        domain: &DomainName,
        candidates: Vec<UploadCandidate>,
    ) -> Result<UploadReport, UploadError> {
        if candidates.is_empty() {
            return Err(UploadError::NoFiles);
        }

        let mut report = UploadReport::default();
        let mut accepted = Vec::new();
        for candidate in candidates {
            match self.policy.check(&candidate) {
                Ok(()) => accepted.push(candidate),
                Err(rejection) => {
                    tracing::info!(file = %candidate.name, reason = %rejection, "Upload rejected");
                    report.rejected.push(RejectedFile {
                        name: candidate.name,
                        reason: rejection.to_string(),
                    });
                }
            }
        }

        if !accepted.is_empty() {
            tokio::time::sleep(self.delay).await;
        }

        for candidate in accepted {
            let file = self
                .files
                .insert(UploadedFile {
                    id: FileId::generate(),
                    name: candidate.name,
                    size: candidate.size,
                    content_type: candidate.content_type,
                    domain: domain.clone(),
                    uploaded_at: Utc::now(),
                })
                .await;
            tracing::info!(file_id = %file.id, domain = %file.domain, size = file.size, "File uploaded");
            report.accepted.push(file);
        }

        Ok(report)
    }

    /// All uploaded files, oldest first.
    pub async fn list(&self) -> Vec<UploadedFile> {
        self.files.list().await
    }

    /// Files a chat session with `scope` may see.
    pub async fn list_visible(&self, scope: &AccessScope) -> Vec<UploadedFile> {
        self.files.list_visible(scope).await
    }

    /// Remove an uploaded file.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::NotFound` if the ID is unknown.
    pub async fn delete(&self, id: FileId) -> Result<UploadedFile, UploadError> {
        let file = self.files.delete(id).await?;
        tracing::info!(file_id = %file.id, "File removed");
        Ok(file)
    }
}

/// Human-readable file size: `0 Bytes`, `512 Bytes`, `1.5 KB`, `10 MB`.
///
/// Binary units with up to two decimals, trailing zeros dropped.
#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    #[allow(clippy::cast_precision_loss)] // Display only
    let mut value = bytes as f64;
    let mut units = UNITS.iter().copied();
    let mut unit = units.next().unwrap_or_default();
    for next in units {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {unit}")
}

/// Size ceiling as shown in rejection messages, e.g. `10MB`.
fn format_limit(bytes: u64) -> String {
    format_file_size(bytes).replace(' ', "")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use crate::config::DEFAULT_MAX_UPLOAD_BYTES;

    use super::*;

    fn candidate(name: &str, content_type: &str, size: u64) -> UploadCandidate {
        UploadCandidate {
            name: name.to_string(),
            content_type: content_type.to_string(),
            size,
        }
    }

    fn legal() -> DomainName {
        DomainName::parse("Legal").unwrap()
    }

    #[test]
    fn test_policy_accepts_allowed_types() {
        let policy = UploadPolicy::new(DEFAULT_MAX_UPLOAD_BYTES);
        for mime in ALLOWED_TYPES {
            assert!(policy.check(&candidate("doc", mime, 10)).is_ok(), "{mime}");
        }
        assert!(policy.check(&candidate("doc.pdf", "Application/PDF", 10)).is_ok());
    }

    #[test]
    fn test_policy_rejects_disallowed_type() {
        let policy = UploadPolicy::new(DEFAULT_MAX_UPLOAD_BYTES);
        let err = policy
            .check(&candidate("script.exe", "application/x-msdownload", 10))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "File type not allowed: script.exe. Please upload PDF, DOCX, MD, PNG, or JPG files."
        );
        assert!(policy.check(&candidate("blank", "", 10)).is_err());
    }

    #[test]
    fn test_policy_rejects_oversized_file() {
        let policy = UploadPolicy::new(DEFAULT_MAX_UPLOAD_BYTES);
        assert!(
            policy
                .check(&candidate("big.pdf", "application/pdf", DEFAULT_MAX_UPLOAD_BYTES))
                .is_ok()
        );
        let err = policy
            .check(&candidate("big.pdf", "application/pdf", DEFAULT_MAX_UPLOAD_BYTES + 1))
            .unwrap_err();
        assert_eq!(err.to_string(), "File too large: big.pdf. Maximum size is 10MB.");
    }

    #[test]
    fn test_type_is_checked_before_size() {
        let policy = UploadPolicy::new(10);
        let err = policy.check(&candidate("huge.zip", "application/zip", 100)).unwrap_err();
        assert!(matches!(err, UploadRejection::DisallowedType { .. }));
    }

    #[tokio::test]
    async fn test_disallowed_file_never_listed() {
        let db = MemoryDb::new();
        let service = UploadService::new(
            &db,
            UploadPolicy::new(DEFAULT_MAX_UPLOAD_BYTES),
            Duration::ZERO,
        );

        let report = service
            .upload(
                &legal(),
                vec![
                    candidate("Contract_Template.pdf", "application/pdf", 1024),
                    candidate("malware.exe", "application/x-msdownload", 1024),
                ],
            )
            .await
            .unwrap();

        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].name, "malware.exe");

        let names: Vec<String> = service.list().await.into_iter().map(|f| f.name).collect();
        assert_eq!(names, ["Contract_Template.pdf"]);
    }

    #[tokio::test]
    async fn test_upload_requires_files() {
        let db = MemoryDb::new();
        let service = UploadService::new(&db, UploadPolicy::new(10), Duration::ZERO);
        let err = service.upload(&legal(), Vec::new()).await.unwrap_err();
        assert!(matches!(err, UploadError::NoFiles));
    }

    #[tokio::test]
    async fn test_delete_unknown_file() {
        let db = MemoryDb::new();
        let service = UploadService::new(&db, UploadPolicy::new(10), Duration::ZERO);
        let err = service.delete(FileId::generate()).await.unwrap_err();
        assert!(matches!(err, UploadError::NotFound));
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_waits_for_simulated_transfer() {
        let db = MemoryDb::new();
        let service = UploadService::new(&db, UploadPolicy::new(1024), Duration::from_secs(1));
        let started = tokio::time::Instant::now();

        service
            .upload(&legal(), vec![candidate("a.png", "image/png", 1)])
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_secs(1));
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10 MB");
        assert_eq!(format_file_size(1_234_567), "1.18 MB");
    }
}

//! Uploaded-file metadata repository.

use nexus_core::{AccessScope, FileId};

use super::{MemoryDb, RepositoryError};
use crate::models::upload::UploadedFile;

/// Repository for uploaded-file metadata.
pub struct FileRepository<'a> {
    db: &'a MemoryDb,
}

impl<'a> FileRepository<'a> {
    /// Create a new file repository.
    #[must_use]
    pub const fn new(db: &'a MemoryDb) -> Self {
        Self { db }
    }

    /// Record an uploaded file.
    pub async fn insert(&self, file: UploadedFile) -> UploadedFile {
        self.db.files.write().await.push(file.clone());
        file
    }

    /// All files, oldest first.
    pub async fn list(&self) -> Vec<UploadedFile> {
        self.db.files.read().await.clone()
    }

    /// Files whose sector is visible to `scope`, oldest first.
    pub async fn list_visible(&self, scope: &AccessScope) -> Vec<UploadedFile> {
        self.db
            .files
            .read()
            .await
            .iter()
            .filter(|file| scope.permits(&file.domain))
            .cloned()
            .collect()
    }

    /// Remove a file from the list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no file has this ID.
    pub async fn delete(&self, id: FileId) -> Result<UploadedFile, RepositoryError> {
        let mut files = self.db.files.write().await;
        let index = files
            .iter()
            .position(|file| file.id == id)
            .ok_or(RepositoryError::NotFound)?;
        Ok(files.remove(index))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Utc;

    use nexus_core::DomainName;

    use super::*;

    fn file(name: &str, domain: &str) -> UploadedFile {
        UploadedFile {
            id: FileId::generate(),
            name: name.to_string(),
            size: 42,
            content_type: "application/pdf".to_string(),
            domain: DomainName::parse(domain).unwrap(),
            uploaded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_visibility_follows_scope() {
        let db = MemoryDb::new();
        let repo = FileRepository::new(&db);
        repo.insert(file("Contract_Template.pdf", "Legal")).await;
        repo.insert(file("Clinical_Trial_Data.pdf", "Medical")).await;

        let legal = AccessScope::Locked(DomainName::parse("Legal").unwrap());
        let visible = repo.list_visible(&legal).await;
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Contract_Template.pdf");

        assert_eq!(repo.list_visible(&AccessScope::General).await.len(), 2);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = MemoryDb::new();
        let repo = FileRepository::new(&db);
        let kept = repo.insert(file("a.pdf", "Legal")).await;
        let removed = repo.insert(file("b.pdf", "Legal")).await;

        let deleted = repo.delete(removed.id).await.unwrap();
        assert_eq!(deleted.name, "b.pdf");

        let remaining = repo.list().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, kept.id);

        assert!(matches!(
            repo.delete(removed.id).await,
            Err(RepositoryError::NotFound)
        ));
    }
}

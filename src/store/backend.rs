//! Media the document is loaded from and persisted to.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::store::{Document, StoreError};

/// Port for document persistence.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Read the current document.
    async fn load(&self) -> Result<Document, StoreError>;

    /// Durably replace the document.
    async fn persist(&self, document: &Document) -> Result<(), StoreError>;
}

/// Document saved as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Create a new [`JsonFileBackend`].
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn temporary_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl Backend for JsonFileBackend {
    async fn load(&self) -> Result<Document, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => {
                let document = Document::default();
                self.persist(&document).await?;
                Ok(document)
            },
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "creating empty document");

                let document = Document::default();
                self.persist(&document).await?;
                Ok(document)
            },
            Err(err) => Err(err.into()),
        }
    }

    async fn persist(&self, document: &Document) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(document)?;

        if let Some(parent) =
            self.path.parent().filter(|p| !p.as_os_str().is_empty())
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        // write aside then swap, so a crash never leaves half a document.
        let temporary = self.temporary_path();
        tokio::fs::write(&temporary, bytes).await?;
        tokio::fs::rename(&temporary, &self.path).await?;

        Ok(())
    }
}

/// Document kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    document: std::sync::Mutex<Document>,
}

impl MemoryBackend {
    pub fn new(document: Document) -> Self {
        Self {
            document: std::sync::Mutex::new(document),
        }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn load(&self) -> Result<Document, StoreError> {
        let document = self
            .document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(document.clone())
    }

    async fn persist(&self, document: &Document) -> Result<(), StoreError> {
        let mut current = self
            .document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = document.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::User;

    #[tokio::test]
    async fn test_missing_file_materializes_empty_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let backend = JsonFileBackend::new(&path);

        let document = backend.load().await.unwrap();
        assert_eq!(document, Document::default());

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!({ "users": [], "posts": [], "comments": [] })
        );
    }

    #[tokio::test]
    async fn test_persisted_document_is_loaded_back() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("db.json"));

        let document = Document {
            users: vec![User {
                id: "1".into(),
                google_id: "g".into(),
                name: "Ada".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        backend.persist(&document).await.unwrap();

        assert_eq!(backend.load().await.unwrap(), document);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = JsonFileBackend::new(&path).load().await;
        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }
}

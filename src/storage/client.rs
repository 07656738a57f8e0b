use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::AppError;

/// Trait for blob storage operations.
///
/// Abstracted as a trait so tests can use a mock without touching the disk.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Upload content to the given key.
    async fn put_object(&self, key: &str, content: Vec<u8>) -> Result<(), AppError>;

    /// Remove an object. Removing a missing key is not an error.
    async fn delete_object(&self, key: &str) -> Result<(), AppError>;
}

/// Stores objects as flat files in a single directory.
pub struct LocalStorageClient {
    root: PathBuf,
}

impl LocalStorageClient {
    /// Create the client, creating `root` if it doesn't exist yet.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            AppError::Storage(format!("Failed to create '{}': {}", root.display(), e))
        })?;

        Ok(Self { root })
    }

    /// Keys are plain file names; anything that could escape `root` is refused.
    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(AppError::Storage(format!("Invalid object key '{key}'")));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl StorageClient for LocalStorageClient {
    async fn put_object(&self, key: &str, content: Vec<u8>) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write object '{}': {}", key, e)))
    }

    async fn delete_object(&self, key: &str) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to delete object '{}': {}",
                key, e
            ))),
        }
    }
}

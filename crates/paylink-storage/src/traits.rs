//! Object store abstraction
//!
//! This module defines the Storage trait that all object storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use paylink_core::AppError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("File not found: {}", key)),
            StorageError::InvalidKey(msg) => AppError::Validation(msg),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
            other @ (StorageError::UploadFailed(_)
            | StorageError::DownloadFailed(_)
            | StorageError::DeleteFailed(_)
            | StorageError::AlreadyExists(_)
            | StorageError::BackendError(_)
            | StorageError::IoError(_)) => AppError::Storage(other.to_string()),
        }
    }
}

/// Location of a stored blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

/// Object store port
///
/// Callers choose the key (see `keys::generate_content_key`); the backend
/// returns a durable public URL. With `upsert = false` an existing key is an
/// `AlreadyExists` error instead of an overwrite.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn upload(
        &self,
        storage_key: &str,
        content_type: &str,
        data: Bytes,
        upsert: bool,
    ) -> StorageResult<StoredObject>;

    /// Download a file by its storage key
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Delete a file by its storage key. Deleting a missing key succeeds.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

/// Reject keys that could escape the storage root.
pub(crate) fn check_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() || storage_key.contains("..") || storage_key.starts_with('/') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_failures_become_storage_errors() {
        let err: AppError = StorageError::UploadFailed("timeout".to_string()).into();
        assert!(matches!(err, AppError::Storage(ref msg) if msg.contains("timeout")));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(AppError::from(StorageError::IoError(io)), AppError::Storage(_)));
    }

    #[test]
    fn key_problems_are_client_errors() {
        assert!(matches!(
            AppError::from(StorageError::InvalidKey("bad".to_string())),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(StorageError::NotFound("content/x".to_string())),
            AppError::NotFound(_)
        ));
        assert!(check_key("../etc").is_err());
        assert!(check_key("/abs").is_err());
        assert!(check_key("").is_err());
        assert!(check_key("content/1-a.txt").is_ok());
    }
}

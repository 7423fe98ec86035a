//! Secure storage backends
//!
//! Platform keychains are reached through [`SecureStorage`]; the two
//! backends here cover tests and desktop builds.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::ClientError;

/// Key/value secret storage
///
/// Writes must be atomic: a reader sees either the previous value or the
/// new one, never a partial write.
#[async_trait]
pub trait SecureStorage: Send + Sync {
    /// Read an entry; `Ok(None)` when absent
    async fn read(&self, key: &str) -> Result<Option<String>, ClientError>;

    /// Create or replace an entry
    async fn write(&self, key: &str, value: &str) -> Result<(), ClientError>;

    /// Remove an entry; removing an absent entry succeeds
    async fn delete(&self, key: &str) -> Result<(), ClientError>;
}

/// Process-local storage, for tests
#[derive(Debug, Clone, Default)]
pub struct MemorySecureStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySecureStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecureStorage for MemorySecureStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), ClientError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

/// One file per entry inside a private directory
///
/// Values are written to a temporary file next to the target and renamed
/// over it.
#[derive(Debug, Clone)]
pub struct FileSecureStorage {
    dir: PathBuf,
}

impl FileSecureStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

fn storage_error(action: &str, error: std::io::Error) -> ClientError {
    ClientError::Storage(format!("failed to {}: {}", action, error))
}

#[async_trait]
impl SecureStorage for FileSecureStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, ClientError> {
        match tokio::fs::read_to_string(self.entry_path(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(storage_error("read entry", error)),
        }
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), ClientError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| storage_error("prepare storage directory", e))?;

        let path = self.entry_path(key);
        let temp_path = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));

        tokio::fs::write(&temp_path, value)
            .await
            .map_err(|e| storage_error("write entry", e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(|e| storage_error("restrict entry permissions", e))?;
        }

        if let Err(error) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(storage_error("finalize entry", error));
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), ClientError> {
        match tokio::fs::remove_file(self.entry_path(key)).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(storage_error("delete entry", error)),
        }
    }
}

use crate::domain::model::StoredCredentials;
use crate::domain::ports::CredentialStore;
use crate::utils::error::{ClientError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// 以 JSON 檔保存憑證，相當於瀏覽器的 local storage
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<StoredCredentials> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoredCredentials::default())
            }
            Err(e) => return Err(ClientError::IoError(e)),
        };

        if content.trim().is_empty() {
            return Ok(StoredCredentials::default());
        }

        serde_json::from_str(&content).map_err(|e| ClientError::StorageError {
            message: format!("{} is not a valid credentials file: {}", self.path.display(), e),
        })
    }

    async fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        if credentials.is_empty() {
            return self.clear().await;
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(credentials)?;
        tokio::fs::write(&self.path, json).await?;
        tracing::debug!("💾 Credentials saved to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::debug!("🗑️ Credentials removed from {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::IoError(e)),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: Mutex<StoredCredentials>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: StoredCredentials) -> Self {
        Self {
            credentials: Mutex::new(credentials),
        }
    }

    pub async fn snapshot(&self) -> StoredCredentials {
        self.credentials.lock().await.clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<StoredCredentials> {
        Ok(self.credentials.lock().await.clone())
    }

    async fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        *self.credentials.lock().await = credentials.clone();
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.credentials.lock().await = StoredCredentials::default();
        Ok(())
    }
}

use crate::domain::model::{Destination, StoredCredentials};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// 憑證持久化（本地儲存 + cookie 備援通道）
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> Result<StoredCredentials>;
    async fn save(&self, credentials: &StoredCredentials) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: Destination);
}

pub trait Clock: Send + Sync {
    /// 目前時間（Unix 秒）
    fn now_timestamp(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_timestamp(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn credentials_path(&self) -> &str;
}

//! Key-Value Store Port - 外部持久存储
//!
//! 只假设简单的 get/set/delete/list 语义，没有事务

use async_trait::async_trait;
use thiserror::Error;

/// 持久存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store operation failed: {0}")]
    OperationFailed(String),
}

/// Key-Value Store Port
#[async_trait]
pub trait KeyValueStorePort: Send + Sync {
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// 删除 key，存在并已删除时返回 true
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// 列出带前缀的 key
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// 统计带前缀的 key 数量
    async fn count(&self, prefix: &str) -> Result<usize, StoreError> {
        Ok(self.list_keys(prefix).await?.len())
    }
}

//! Sled-based Key-Value Store Implementation
//!
//! 持久会话的外部存储，值为 UTF-8 JSON 字符串

use async_trait::async_trait;
use sled::Db;
use std::path::Path;
use std::sync::Arc;

use crate::application::ports::{KeyValueStorePort, StoreError};

/// Sled 存储配置
#[derive(Debug, Clone)]
pub struct SledStoreConfig {
    /// 数据库路径
    pub db_path: String,
}

impl Default for SledStoreConfig {
    fn default() -> Self {
        Self {
            db_path: "data/sessions.sled".to_string(),
        }
    }
}

/// Sled Key-Value 存储
pub struct SledKeyValueStore {
    db: Db,
}

impl SledKeyValueStore {
    /// 打开（或创建）数据库
    pub fn new(config: &SledStoreConfig) -> Result<Self, StoreError> {
        let db = sled::open(&config.db_path).map_err(|e| StoreError::Unavailable(e.to_string()))?;

        tracing::info!(
            db_path = %config.db_path,
            keys = db.len(),
            "SledKeyValueStore initialized"
        );

        Ok(Self { db })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::new(&SledStoreConfig {
            db_path: path.as_ref().to_string_lossy().to_string(),
        })
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    async fn flush(&self) -> Result<(), StoreError> {
        self.db
            .flush_async()
            .await
            .map(|_| ())
            .map_err(|e| StoreError::OperationFailed(e.to_string()))
    }
}

fn op_err(e: sled::Error) -> StoreError {
    StoreError::OperationFailed(e.to_string())
}

#[async_trait]
impl KeyValueStorePort for SledKeyValueStore {
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.db.insert(key, value.into_bytes()).map_err(op_err)?;
        self.flush().await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.db.get(key).map_err(op_err)? {
            Some(data) => String::from_utf8(data.to_vec())
                .map(Some)
                .map_err(|e| StoreError::OperationFailed(e.to_string())),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let removed = self.db.remove(key).map_err(op_err)?.is_some();
        if removed {
            self.flush().await?;
        }
        Ok(removed)
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.db.contains_key(key).map_err(op_err)
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        for item in self.db.scan_prefix(prefix) {
            let (key, _) = item.map_err(op_err)?;
            keys.push(String::from_utf8_lossy(&key).into_owned());
        }
        Ok(keys)
    }

    async fn count(&self, prefix: &str) -> Result<usize, StoreError> {
        let mut count = 0;
        for item in self.db.scan_prefix(prefix).keys() {
            item.map_err(op_err)?;
            count += 1;
        }
        Ok(count)
    }
}

//! Session Manager Port - 会话生命周期管理
//!
//! 定义会话管理的抽象接口，具体实现在 infrastructure/memory 层

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::domain::{SessionDraft, SessionRecord, SessionUpdate};

/// Session Manager 错误
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Session expired: {0}")]
    Expired(String),

    #[error("Persistent session store is not configured")]
    PersistentTierDisabled,

    #[error("Persistent session store error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// 会话存储层级选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierRequest {
    /// 临时会话，ttl 为空时使用默认 TTL
    Transient { ttl: Option<chrono::Duration> },
    Persistent,
}

/// 会话统计信息
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub in_memory_sessions: usize,
    pub active_sessions: usize,
    pub expired_sessions: usize,
    pub persistent_sessions: usize,
    pub total_sessions: usize,
    pub default_ttl_hours: f64,
    pub persistent_enabled: bool,
}

/// Session Manager Port
///
/// 双层会话存储：
/// - 临时会话保存在进程内，到期后失效
/// - 持久会话委托给外部存储，永不过期
///
/// 调用方拿到的都是快照，修改必须经过 `update`
#[async_trait]
pub trait SessionManagerPort: Send + Sync {
    /// 创建会话
    async fn create(
        &self,
        draft: SessionDraft,
        tier: TierRequest,
    ) -> Result<SessionRecord, SessionError>;

    /// 获取会话；不存在或已过期返回 None
    async fn get(&self, id: &str) -> Option<SessionRecord>;

    /// 更新会话，返回更新后的快照
    async fn update(&self, id: &str, update: SessionUpdate)
        -> Result<SessionRecord, SessionError>;

    /// 删除会话，任一层级删除成功即返回 true
    async fn delete(&self, id: &str) -> bool;

    /// 清理进程内过期会话，返回清理数量
    async fn cleanup_expired(&self) -> usize;

    /// 获取统计信息
    async fn stats(&self) -> SessionStats;
}

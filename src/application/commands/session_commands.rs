//! Session Commands - 会话相关命令

use crate::domain::{SessionMetadata, SessionRecord};

/// 创建会话命令
#[derive(Debug, Clone, Default)]
pub struct CreateSessionCommand {
    pub text: String,
    pub voice: String,
    pub name: Option<String>,
    /// 临时会话 TTL（小时），为空时使用默认值，0 表示立即过期
    pub ttl_hours: Option<f64>,
    pub metadata: SessionMetadata,
    pub persistent: bool,
}

/// 分句命令 - 对会话文本分句分词并保存结果
#[derive(Debug, Clone)]
pub struct SegmentSessionCommand {
    pub session_id: String,
}

/// 删除会话命令
#[derive(Debug, Clone)]
pub struct DeleteSessionCommand {
    pub session_id: String,
}

/// 删除会话响应
#[derive(Debug, Clone)]
pub struct DeleteSessionResponse {
    pub session_id: String,
}

/// 会话命令响应
pub type SessionResponse = SessionRecord;

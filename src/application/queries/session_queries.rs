//! Session Queries

/// 获取会话查询
#[derive(Debug, Clone)]
pub struct GetSession {
    pub session_id: String,
}

/// 会话统计查询
#[derive(Debug, Clone)]
pub struct GetSessionStats;

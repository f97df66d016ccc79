//! Voice Queries

/// 列出音色目录查询（使用目录缓存）
#[derive(Debug, Clone)]
pub struct ListVoices;

/// 强制刷新音色目录查询
#[derive(Debug, Clone)]
pub struct RefreshVoices;

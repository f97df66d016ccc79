//! Speech Commands - 语音生成与缓存维护命令

use crate::domain::SpeechRequest;

/// 生成语音命令
#[derive(Debug, Clone)]
pub struct GenerateSpeechCommand {
    pub request: SpeechRequest,
    pub use_cache: bool,
}

/// 预加载缓存命令
#[derive(Debug, Clone)]
pub struct PreloadCacheCommand {
    pub request: SpeechRequest,
    /// 缓存 TTL（小时），为空时使用默认 TTL
    pub ttl_hours: Option<f64>,
}

/// 预加载响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadCacheResponse {
    pub cached: bool,
    pub already_cached: bool,
}

/// 清空缓存命令
#[derive(Debug, Clone)]
pub struct ClearCacheCommand;

/// 清理过期缓存命令
#[derive(Debug, Clone)]
pub struct ClearExpiredCacheCommand;

/// 缓存清理响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearCacheResponse {
    pub removed: usize,
}

//! Cache Queries

/// 缓存统计查询
#[derive(Debug, Clone)]
pub struct GetCacheStats;

/// 缓存条目列表查询
#[derive(Debug, Clone)]
pub struct ListCacheEntries;

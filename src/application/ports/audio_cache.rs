//! Audio Cache Port - 音频缓存管理
//!
//! 定义音频缓存的抽象接口，具体实现为文件系统 + 元数据索引 (LRU + TTL)

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::domain::{RequestDigest, SpeechRequest};

/// Audio Cache 错误
///
/// 只有写入路径会返回错误；读取失败一律按未命中处理
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Entry of {size} bytes exceeds cache budget of {max} bytes")]
    CapacityExceeded { size: u64, max: u64 },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 缓存条目元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub fingerprint: String,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub access_count: u64,
    pub size_bytes: u64,
    /// TTL（秒）
    pub ttl_secs: i64,
    /// 写入序号，LRU 时间相同时先写入者先淘汰
    pub seq: u64,
    #[serde(default)]
    pub source_params_digest: Option<RequestDigest>,
}

impl CacheEntry {
    pub fn ttl(&self) -> Option<Duration> {
        Duration::try_seconds(self.ttl_secs)
    }

    /// 超出可表示的时间范围时视为永不过期
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.ttl()
            .and_then(|ttl| self.created_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// 当前时间严格晚于 created_at + ttl 时过期
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at()
    }
}

/// 缓存条目详情（对外展示）
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntryInfo {
    pub cache_key: String,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub access_count: u64,
    pub file_size: u64,
    pub ttl_hours: f64,
    pub is_expired: bool,
    pub request_params: Option<RequestDigest>,
}

impl CacheEntryInfo {
    pub fn from_entry(entry: &CacheEntry, now: DateTime<Utc>) -> Self {
        Self {
            cache_key: entry.fingerprint.clone(),
            created_at: entry.created_at,
            last_accessed: entry.last_accessed,
            expires_at: entry.expires_at(),
            access_count: entry.access_count,
            file_size: entry.size_bytes,
            ttl_hours: entry.ttl_secs as f64 / 3600.0,
            is_expired: entry.is_expired(now),
            request_params: entry.source_params_digest.clone(),
        }
    }
}

/// 缓存统计信息
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub total_requests: u64,
    pub cache_size_bytes: u64,
    pub files_count: usize,
    pub hit_rate: f64,
    pub cache_size_mb: f64,
    pub max_cache_size_mb: f64,
}

impl CacheStats {
    /// 命中率，无请求时为 0
    pub fn compute_hit_rate(hits: u64, total: u64) -> f64 {
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

/// 字节数换算为 MB，保留两位小数
pub fn bytes_to_mb(bytes: u64) -> f64 {
    (bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0
}

/// Audio Cache Port
///
/// 基于请求指纹的 LRU + TTL 缓存
/// - 读取失败（过期、文件缺失、IO 错误）都视为未命中，并清理对应条目
/// - 写入前按 last_accessed 升序淘汰，保证总大小不超过预算
#[async_trait]
pub trait AudioCachePort: Send + Sync {
    /// 获取缓存音频，命中时更新访问时间和访问次数
    async fn get(&self, request: &SpeechRequest) -> Option<Vec<u8>>;

    /// 写入缓存音频，`ttl` 为空时使用默认 TTL
    async fn put(
        &self,
        request: &SpeechRequest,
        audio_data: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError>;

    /// 清理所有过期条目，返回清理数量
    async fn clear_expired(&self) -> usize;

    /// 清空缓存，返回清理数量
    async fn clear_all(&self) -> usize;

    /// 获取缓存统计信息
    async fn stats(&self) -> CacheStats;

    /// 列出所有条目，按最近访问时间倒序
    async fn entries(&self) -> Vec<CacheEntryInfo>;
}

/// 指纹的规范化字段，字段按字母序声明以保证序列化顺序稳定
#[derive(Serialize)]
struct FingerprintFields<'a> {
    pitch: &'a str,
    rate: &'a str,
    text: &'a str,
    voice: &'a str,
    volume: &'a str,
}

/// 生成缓存 key
///
/// sha256(json{pitch, rate, text.trim(), voice, volume})，64 位十六进制
pub fn generate_cache_key(request: &SpeechRequest) -> String {
    let fields = FingerprintFields {
        pitch: &request.pitch,
        rate: &request.rate,
        text: request.normalized_text(),
        voice: &request.voice,
        volume: &request.volume,
    };
    // 仅含字符串字段，序列化不会失败
    let canonical = serde_json::to_string(&fields).unwrap_or_default();
    hex::encode(Sha256::digest(canonical.as_bytes()))
}

/// 日志中使用的短 key
pub fn short_key(cache_key: &str) -> &str {
    &cache_key[..cache_key.len().min(16)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str) -> SpeechRequest {
        SpeechRequest::new(text, "zh-CN-XiaoxiaoNeural")
    }

    #[test]
    fn test_fingerprint_ignores_surrounding_whitespace() {
        let a = generate_cache_key(&request("你好，世界"));
        let b = generate_cache_key(&request("  你好，世界\n\t"));
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_fingerprint_differs_per_parameter() {
        let base = request("你好");
        let base_key = generate_cache_key(&base);

        let variants = [
            base.clone().with_rate("+10%"),
            base.clone().with_volume("-10%"),
            base.clone().with_pitch("+5Hz"),
            SpeechRequest::new("你好", "zh-HK-HiuMaanNeural"),
            request("你好吗"),
        ];
        for variant in &variants {
            assert_ne!(generate_cache_key(variant), base_key, "{:?}", variant);
        }
    }

    #[test]
    fn test_inner_whitespace_is_significant() {
        assert_ne!(
            generate_cache_key(&request("你 好")),
            generate_cache_key(&request("你好"))
        );
    }

    #[test]
    fn test_hit_rate_without_requests() {
        assert_eq!(CacheStats::compute_hit_rate(0, 0), 0.0);
        assert_eq!(CacheStats::compute_hit_rate(1, 4), 0.25);
    }

    #[test]
    fn test_bytes_to_mb_rounding() {
        assert_eq!(bytes_to_mb(500 * 1024 * 1024), 500.0);
        assert_eq!(bytes_to_mb(1024 * 1024 + 1024 * 10), 1.01);
    }

    #[test]
    fn test_unrepresentable_expiry_never_expires() {
        let now = Utc::now();
        for ttl_secs in [i64::MAX, 100_000_000 * 86_400] {
            let entry = CacheEntry {
                fingerprint: "k".repeat(64),
                created_at: now,
                last_accessed: now,
                access_count: 0,
                size_bytes: 4,
                ttl_secs,
                seq: 0,
                source_params_digest: None,
            };
            assert_eq!(entry.expires_at(), DateTime::<Utc>::MAX_UTC);
            assert!(!entry.is_expired(now + Duration::days(365 * 1000)));

            let info = CacheEntryInfo::from_entry(&entry, now);
            assert!(!info.is_expired);
        }
    }

    #[test]
    fn test_short_key() {
        assert_eq!(short_key("0123456789abcdef0123"), "0123456789abcdef");
        assert_eq!(short_key("abc"), "abc");
    }
}

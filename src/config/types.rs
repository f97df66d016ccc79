//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::application::error::MAX_TTL_HOURS;

/// 小时数换算为 chrono Duration，截断到 TTL 上限
fn clamped_hours(hours: f64) -> chrono::Duration {
    let hours = if hours.is_finite() { hours.clamp(0.0, MAX_TTL_HOURS) } else { 0.0 };
    chrono::Duration::seconds((hours * 3600.0).round() as i64)
}

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// TTS 服务配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 音频缓存配置
    #[serde(default)]
    pub cache: CacheConfig,

    /// 会话配置
    #[serde(default)]
    pub session: SessionConfig,

    /// 持久会话存储配置
    #[serde(default)]
    pub store: StoreConfig,

    /// 音色目录配置
    #[serde(default)]
    pub voices: VoicesConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// TTS 服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    /// TTS 服务基础 URL
    #[serde(default = "default_tts_url")]
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,
}

fn default_tts_url() -> String {
    "http://localhost:5050".to_string()
}

fn default_tts_timeout() -> u64 {
    60
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            url: default_tts_url(),
            timeout_secs: default_tts_timeout(),
        }
    }
}

/// 音频缓存配置
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// 缓存目录
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,

    /// 缓存容量上限（MB）
    #[serde(default = "default_cache_max_size_mb")]
    pub max_size_mb: u64,

    /// 默认 TTL（小时）
    #[serde(default = "default_cache_ttl_hours")]
    pub default_ttl_hours: u64,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

fn default_cache_max_size_mb() -> u64 {
    500
}

fn default_cache_ttl_hours() -> u64 {
    24 * 7
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            max_size_mb: default_cache_max_size_mb(),
            default_ttl_hours: default_cache_ttl_hours(),
        }
    }
}

impl CacheConfig {
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(1024 * 1024)
    }

    pub fn default_ttl(&self) -> chrono::Duration {
        clamped_hours(self.default_ttl_hours as f64)
    }
}

/// 会话配置
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// 临时会话默认 TTL（小时）
    #[serde(default = "default_session_ttl_hours")]
    pub ttl_hours: f64,

    /// 过期会话清理间隔（秒）
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

fn default_session_ttl_hours() -> f64 {
    1.0
}

fn default_cleanup_interval() -> u64 {
    300
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_session_ttl_hours(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

impl SessionConfig {
    pub fn default_ttl(&self) -> chrono::Duration {
        clamped_hours(self.ttl_hours)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

/// 持久会话存储配置 (sled)
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// 是否启用持久层
    #[serde(default)]
    pub enabled: bool,

    /// sled 数据库路径
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/sessions.sled")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_store_path(),
        }
    }
}

/// 音色目录配置
#[derive(Debug, Clone, Deserialize)]
pub struct VoicesConfig {
    /// 目录缓存时长（秒）
    #[serde(default = "default_catalog_ttl")]
    pub catalog_ttl_secs: u64,
}

fn default_catalog_ttl() -> u64 {
    24 * 3600
}

impl Default for VoicesConfig {
    fn default() -> Self {
        Self {
            catalog_ttl_secs: default_catalog_ttl(),
        }
    }
}

impl VoicesConfig {
    pub fn catalog_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog_ttl_secs)
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.tts.url, "http://localhost:5050");
        assert_eq!(config.cache.max_size_bytes(), 500 * 1024 * 1024);
        assert_eq!(config.cache.default_ttl(), chrono::Duration::days(7));
        assert!(!config.store.enabled);
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_session_durations() {
        let config = SessionConfig {
            ttl_hours: 0.5,
            cleanup_interval_secs: 60,
        };
        assert_eq!(config.default_ttl(), chrono::Duration::minutes(30));
        assert_eq!(config.cleanup_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_huge_ttls_are_clamped() {
        let cache = CacheConfig {
            default_ttl_hours: u64::MAX,
            ..Default::default()
        };
        let session = SessionConfig {
            ttl_hours: 1e13,
            cleanup_interval_secs: 60,
        };
        let limit = chrono::Duration::seconds((MAX_TTL_HOURS * 3600.0) as i64);
        assert_eq!(cache.default_ttl(), limit);
        assert_eq!(session.default_ttl(), limit);
    }

    #[test]
    fn test_partial_deserialize_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"cache": {"max_size_mb": 64}, "store": {"enabled": true}}"#)
                .unwrap();
        assert_eq!(config.cache.max_size_mb, 64);
        assert_eq!(config.cache.dir, PathBuf::from("cache"));
        assert_eq!(config.store.path, PathBuf::from("data/sessions.sled"));
        assert_eq!(config.session.cleanup_interval_secs, 300);
    }
}

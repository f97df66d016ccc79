//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;
use crate::application::error::MAX_TTL_HOURS;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `VOXCACHE_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `VOXCACHE_SERVER__PORT=8080`
/// - `VOXCACHE_TTS__URL=http://tts-server:5050`
/// - `VOXCACHE_CACHE__MAX_SIZE_MB=1024`
/// - `VOXCACHE_STORE__ENABLED=true`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8000)?
        .set_default("tts.url", "http://localhost:5050")?
        .set_default("tts.timeout_secs", 60)?
        .set_default("cache.dir", "cache")?
        .set_default("cache.max_size_mb", 500)?
        .set_default("cache.default_ttl_hours", 168)?
        .set_default("session.ttl_hours", 1.0)?
        .set_default("session.cleanup_interval_secs", 300)?
        .set_default("store.enabled", false)?
        .set_default("store.path", "data/sessions.sled")?
        .set_default("voices.catalog_ttl_secs", 86400)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: VOXCACHE_CACHE__DIR=/var/cache/voxcache
    builder = builder.add_source(
        Environment::with_prefix("VOXCACHE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.tts.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "TTS URL cannot be empty".to_string(),
        ));
    }

    if config.cache.max_size_mb == 0 {
        return Err(ConfigError::ValidationError(
            "Cache max size cannot be 0".to_string(),
        ));
    }

    if !config.session.ttl_hours.is_finite()
        || config.session.ttl_hours < 0.0
        || config.session.ttl_hours > MAX_TTL_HOURS
    {
        return Err(ConfigError::ValidationError(format!(
            "Session TTL must be between 0 and {} hours",
            MAX_TTL_HOURS
        )));
    }

    if config.cache.default_ttl_hours as f64 > MAX_TTL_HOURS {
        return Err(ConfigError::ValidationError(format!(
            "Cache default TTL cannot exceed {} hours",
            MAX_TTL_HOURS
        )));
    }

    if config.session.cleanup_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Session cleanup interval cannot be 0".to_string(),
        ));
    }

    if config.store.enabled && config.store.path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Store path cannot be empty when the store is enabled".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("TTS URL: {}", config.tts.url);
    tracing::info!("TTS Timeout: {}s", config.tts.timeout_secs);
    tracing::info!("Cache Directory: {:?}", config.cache.dir);
    tracing::info!("Cache Max Size: {} MB", config.cache.max_size_mb);
    tracing::info!("Cache Default TTL: {}h", config.cache.default_ttl_hours);
    tracing::info!("Session TTL: {}h", config.session.ttl_hours);
    tracing::info!("Session Cleanup Interval: {}s", config.session.cleanup_interval_secs);
    tracing::info!("Persistent Store Enabled: {}", config.store.enabled);
    if config.store.enabled {
        tracing::info!("Persistent Store Path: {:?}", config.store.path);
    }
    tracing::info!("Voice Catalog TTL: {}s", config.voices.catalog_ttl_secs);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_tts_url() {
        let mut config = AppConfig::default();
        config.tts.url = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_cache_budget() {
        let mut config = AppConfig::default();
        config.cache.max_size_mb = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_huge_ttls() {
        let mut config = AppConfig::default();
        config.cache.default_ttl_hours = 10_u64.pow(12);
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.session.ttl_hours = 5e9;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_cleanup_interval() {
        let mut config = AppConfig::default();
        config.session.cleanup_interval_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_enabled_store_without_path() {
        let mut config = AppConfig::default();
        config.store.path = PathBuf::new();
        assert!(validate_config(&config).is_ok());

        config.store.enabled = true;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voxcache.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9100\n\n[cache]\ndir = \"/tmp/vox\"\nmax_size_mb = 64\n",
        )
        .unwrap();

        let config = load_config_from_path(Some(&path)).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.cache.dir, PathBuf::from("/tmp/vox"));
        assert_eq!(config.cache.max_size_mb, 64);
        assert_eq!(config.cache.default_ttl_hours, 168);
        assert_eq!(config.voices.catalog_ttl_secs, 86400);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voxcache.toml");
        std::fs::write(&path, "[session]\ncleanup_interval_secs = 0\n").unwrap();

        let result = load_config_from_path(Some(&path));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}

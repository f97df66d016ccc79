//! Voice Directory - 音色目录
//!
//! 合成服务的音色列表在进程内缓存一段时间。
//! 并发刷新时可能重复请求合成服务，以最后写入的结果为准。

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::application::error::ApplicationError;
use crate::application::ports::TtsEnginePort;
use crate::domain::Voice;

/// 默认目录缓存时长（24 小时）
pub const DEFAULT_CATALOG_TTL: Duration = Duration::from_secs(24 * 60 * 60);

struct CachedCatalog {
    voices: Arc<Vec<Voice>>,
    fetched_at: Instant,
}

/// 音色目录服务
pub struct VoiceDirectory {
    tts: Arc<dyn TtsEnginePort>,
    ttl: Duration,
    catalog: RwLock<Option<CachedCatalog>>,
}

impl VoiceDirectory {
    pub fn new(tts: Arc<dyn TtsEnginePort>, ttl: Duration) -> Self {
        Self {
            tts,
            ttl,
            catalog: RwLock::new(None),
        }
    }

    fn cached(&self) -> Option<Arc<Vec<Voice>>> {
        let catalog = self.catalog.read().unwrap_or_else(|e| e.into_inner());
        catalog
            .as_ref()
            .filter(|c| c.fetched_at.elapsed() < self.ttl)
            .map(|c| c.voices.clone())
    }

    /// 获取音色目录，缓存有效时不访问合成服务
    pub async fn voices(&self) -> Result<Arc<Vec<Voice>>, ApplicationError> {
        match self.cached() {
            Some(voices) => Ok(voices),
            None => self.refresh().await,
        }
    }

    /// 强制从合成服务重新获取目录
    pub async fn refresh(&self) -> Result<Arc<Vec<Voice>>, ApplicationError> {
        let voices = Arc::new(self.tts.list_voices().await?);

        let mut catalog = self.catalog.write().unwrap_or_else(|e| e.into_inner());
        *catalog = Some(CachedCatalog {
            voices: voices.clone(),
            fetched_at: Instant::now(),
        });

        tracing::info!(count = voices.len(), "Voice catalog refreshed");
        Ok(voices)
    }

    /// 检查音色是否在目录中（按 ShortName）
    pub async fn is_valid(&self, short_name: &str) -> Result<bool, ApplicationError> {
        Ok(self
            .voices()
            .await?
            .iter()
            .any(|v| v.short_name == short_name))
    }

    /// 校验音色，不存在时返回验证错误
    pub async fn ensure_valid(&self, short_name: &str) -> Result<(), ApplicationError> {
        if self.is_valid(short_name).await? {
            Ok(())
        } else {
            Err(ApplicationError::validation(format!(
                "Invalid voice: {}",
                short_name
            )))
        }
    }
}

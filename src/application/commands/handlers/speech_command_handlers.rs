//! Speech Command Handlers

use std::sync::Arc;

use crate::application::commands::speech_commands::*;
use crate::application::error::{ensure_not_blank, hours_to_duration, ApplicationError};
use crate::application::ports::{AudioCachePort, AudioStream};
use crate::application::services::{PreloadOutcome, SpeechGenerator, VoiceDirectory};
use crate::domain::SpeechRequest;

/// 生成/预加载前的请求校验：文本与音色非空，音色在目录中
async fn validate_request(
    voices: &VoiceDirectory,
    request: &SpeechRequest,
) -> Result<(), ApplicationError> {
    ensure_not_blank("text", &request.text)?;
    ensure_not_blank("voice", &request.voice)?;
    voices.ensure_valid(&request.voice).await
}

/// GenerateSpeech Handler - 缓存优先生成音频流
pub struct GenerateSpeechHandler {
    generator: Arc<SpeechGenerator>,
    voices: Arc<VoiceDirectory>,
}

impl GenerateSpeechHandler {
    pub fn new(generator: Arc<SpeechGenerator>, voices: Arc<VoiceDirectory>) -> Self {
        Self { generator, voices }
    }

    pub async fn handle(&self, cmd: GenerateSpeechCommand) -> Result<AudioStream, ApplicationError> {
        validate_request(&self.voices, &cmd.request).await?;

        tracing::info!(
            text_len = cmd.request.text.chars().count(),
            voice = %cmd.request.voice,
            use_cache = cmd.use_cache,
            "Generating speech"
        );

        self.generator.stream(cmd.request, cmd.use_cache).await
    }
}

/// PreloadCache Handler - 预生成音频写入缓存
pub struct PreloadCacheHandler {
    generator: Arc<SpeechGenerator>,
    voices: Arc<VoiceDirectory>,
}

impl PreloadCacheHandler {
    pub fn new(generator: Arc<SpeechGenerator>, voices: Arc<VoiceDirectory>) -> Self {
        Self { generator, voices }
    }

    pub async fn handle(
        &self,
        cmd: PreloadCacheCommand,
    ) -> Result<PreloadCacheResponse, ApplicationError> {
        validate_request(&self.voices, &cmd.request).await?;
        let ttl = cmd
            .ttl_hours
            .map(|hours| hours_to_duration("ttl_hours", hours))
            .transpose()?;

        let outcome = self.generator.preload(cmd.request, ttl).await?;
        Ok(PreloadCacheResponse {
            cached: true,
            already_cached: outcome == PreloadOutcome::AlreadyCached,
        })
    }
}

/// ClearCache Handler - 清空缓存
pub struct ClearCacheHandler {
    cache: Arc<dyn AudioCachePort>,
}

impl ClearCacheHandler {
    pub fn new(cache: Arc<dyn AudioCachePort>) -> Self {
        Self { cache }
    }

    pub async fn handle(&self, _cmd: ClearCacheCommand) -> Result<ClearCacheResponse, ApplicationError> {
        let removed = self.cache.clear_all().await;
        Ok(ClearCacheResponse { removed })
    }
}

/// ClearExpiredCache Handler - 清理过期缓存
pub struct ClearExpiredCacheHandler {
    cache: Arc<dyn AudioCachePort>,
}

impl ClearExpiredCacheHandler {
    pub fn new(cache: Arc<dyn AudioCachePort>) -> Self {
        Self { cache }
    }

    pub async fn handle(
        &self,
        _cmd: ClearExpiredCacheCommand,
    ) -> Result<ClearCacheResponse, ApplicationError> {
        let removed = self.cache.clear_expired().await;
        Ok(ClearCacheResponse { removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::DEFAULT_CATALOG_TTL;
    use crate::infrastructure::adapters::FakeTtsClient;
    use crate::infrastructure::persistence::{FileAudioCache, FileCacheConfig};
    use futures_util::TryStreamExt;
    use tempfile::{tempdir, TempDir};

    struct Fixture {
        _dir: TempDir,
        tts: Arc<FakeTtsClient>,
        cache: Arc<FileAudioCache>,
        generator: Arc<SpeechGenerator>,
        voices: Arc<VoiceDirectory>,
    }

    async fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let config = FileCacheConfig {
            cache_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let cache = Arc::new(FileAudioCache::open(&config).await.unwrap());
        let tts = Arc::new(FakeTtsClient::with_defaults());
        let generator = Arc::new(SpeechGenerator::new(tts.clone(), cache.clone()));
        let voices = Arc::new(VoiceDirectory::new(tts.clone(), DEFAULT_CATALOG_TTL));
        Fixture {
            _dir: dir,
            tts,
            cache,
            generator,
            voices,
        }
    }

    #[tokio::test]
    async fn test_generate_rejects_unknown_voice_before_synthesis() {
        let f = fixture().await;
        let handler = GenerateSpeechHandler::new(f.generator.clone(), f.voices.clone());

        let result = handler
            .handle(GenerateSpeechCommand {
                request: SpeechRequest::new("你好", "xx-XX-Nobody"),
                use_cache: true,
            })
            .await;

        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
        assert_eq!(f.tts.synthesize_calls(), 0);
    }

    #[tokio::test]
    async fn test_generate_rejects_blank_text() {
        let f = fixture().await;
        let handler = GenerateSpeechHandler::new(f.generator.clone(), f.voices.clone());

        let result = handler
            .handle(GenerateSpeechCommand {
                request: SpeechRequest::new("   ", "zh-CN-XiaoxiaoNeural"),
                use_cache: true,
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_generate_streams_audio() {
        let f = fixture().await;
        let handler = GenerateSpeechHandler::new(f.generator.clone(), f.voices.clone());
        let request = SpeechRequest::new("你好", "zh-CN-XiaoxiaoNeural");

        let chunks: Vec<bytes::Bytes> = handler
            .handle(GenerateSpeechCommand {
                request: request.clone(),
                use_cache: true,
            })
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(chunks.concat(), FakeTtsClient::audio_for(&request));
        assert_eq!(f.cache.stats().await.files_count, 1);
    }

    #[tokio::test]
    async fn test_preload_then_clear() {
        let f = fixture().await;
        let preload = PreloadCacheHandler::new(f.generator.clone(), f.voices.clone());
        let cmd = PreloadCacheCommand {
            request: SpeechRequest::new("你好", "zh-CN-XiaoxiaoNeural"),
            ttl_hours: Some(2.0),
        };

        let first = preload.handle(cmd.clone()).await.unwrap();
        assert_eq!(first, PreloadCacheResponse { cached: true, already_cached: false });
        let second = preload.handle(cmd).await.unwrap();
        assert!(second.already_cached);

        let expired = ClearExpiredCacheHandler::new(f.cache.clone());
        assert_eq!(expired.handle(ClearExpiredCacheCommand).await.unwrap().removed, 0);

        let clear = ClearCacheHandler::new(f.cache.clone());
        assert_eq!(clear.handle(ClearCacheCommand).await.unwrap().removed, 1);
        assert_eq!(f.cache.stats().await.files_count, 0);
    }

    #[tokio::test]
    async fn test_preload_rejects_negative_ttl() {
        let f = fixture().await;
        let preload = PreloadCacheHandler::new(f.generator.clone(), f.voices.clone());
        let result = preload
            .handle(PreloadCacheCommand {
                request: SpeechRequest::new("你好", "zh-CN-XiaoxiaoNeural"),
                ttl_hours: Some(-3.0),
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
        assert_eq!(f.tts.synthesize_calls(), 0);
    }

    #[tokio::test]
    async fn test_preload_rejects_unrepresentable_ttl() {
        let f = fixture().await;
        let preload = PreloadCacheHandler::new(f.generator.clone(), f.voices.clone());

        for hours in [5e9, 1e13] {
            let result = preload
                .handle(PreloadCacheCommand {
                    request: SpeechRequest::new("你好", "zh-CN-XiaoxiaoNeural"),
                    ttl_hours: Some(hours),
                })
                .await;
            assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
        }

        assert_eq!(f.tts.synthesize_calls(), 0);
        assert_eq!(f.cache.stats().await.files_count, 0);
        assert!(f.cache.entries().await.is_empty());
    }
}

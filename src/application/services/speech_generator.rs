//! Speech Generator - 缓存优先的语音生成
//!
//! 命中缓存时直接分块返回；未命中时边转发合成服务的分块边缓冲，
//! 流完整结束后才写入缓存，中途失败或被调用方丢弃的流不会写入。

use bytes::Bytes;
use chrono::Duration;
use futures_util::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{AudioCachePort, AudioStream, TtsEnginePort};
use crate::domain::SpeechRequest;

/// 缓存命中时的分块大小
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// 预加载结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloadOutcome {
    /// 本次新生成并写入缓存
    Cached,
    /// 缓存中已存在
    AlreadyCached,
}

/// 语音生成服务
pub struct SpeechGenerator {
    tts: Arc<dyn TtsEnginePort>,
    cache: Arc<dyn AudioCachePort>,
    chunk_size: usize,
}

impl SpeechGenerator {
    pub fn new(tts: Arc<dyn TtsEnginePort>, cache: Arc<dyn AudioCachePort>) -> Self {
        Self {
            tts,
            cache,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// 生成音频流
    ///
    /// 合成服务在开始传输前失败时返回 Err，传输中途失败作为流中的 Err 元素
    pub async fn stream(
        &self,
        request: SpeechRequest,
        use_cache: bool,
    ) -> Result<AudioStream, ApplicationError> {
        if use_cache {
            if let Some(audio) = self.cache.get(&request).await {
                return Ok(chunked(audio, self.chunk_size));
            }
        }

        let mut upstream = self.tts.synthesize(&request).await?;
        let cache = use_cache.then(|| self.cache.clone());

        let stream = async_stream::stream! {
            let mut buffer: Vec<u8> = Vec::new();
            let mut complete = true;

            while let Some(item) = upstream.next().await {
                match item {
                    Ok(chunk) => {
                        if cache.is_some() {
                            buffer.extend_from_slice(&chunk);
                        }
                        yield Ok(chunk);
                    }
                    Err(e) => {
                        tracing::warn!(voice = %request.voice, error = %e, "Synthesis stream failed");
                        complete = false;
                        yield Err(e);
                        break;
                    }
                }
            }

            if let (true, Some(cache)) = (complete, cache) {
                if !buffer.is_empty() {
                    if let Err(e) = cache.put(&request, buffer, None).await {
                        tracing::warn!(error = %e, "Failed to cache generated audio");
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }

    /// 预生成并写入缓存
    ///
    /// 与 `stream` 共用同一条合成路径，读完整条流后按指定 TTL 写入
    pub async fn preload(
        &self,
        request: SpeechRequest,
        ttl: Option<Duration>,
    ) -> Result<PreloadOutcome, ApplicationError> {
        if self.cache.get(&request).await.is_some() {
            return Ok(PreloadOutcome::AlreadyCached);
        }

        let audio = read_to_end(self.stream(request.clone(), false).await?).await?;
        if audio.is_empty() {
            return Err(ApplicationError::ExternalServiceError(
                "TTS service returned no audio".to_string(),
            ));
        }
        self.cache.put(&request, audio, ttl).await?;

        tracing::info!(
            text_len = request.text.chars().count(),
            voice = %request.voice,
            "Preloaded audio into cache"
        );
        Ok(PreloadOutcome::Cached)
    }
}

/// 读完整条音频流，任一分块失败即返回错误
async fn read_to_end(stream: AudioStream) -> Result<Vec<u8>, ApplicationError> {
    let chunks: Vec<Bytes> = stream.try_collect().await?;
    Ok(chunks.concat())
}

/// 将完整音频切分为有序分块流
fn chunked(audio: Vec<u8>, chunk_size: usize) -> AudioStream {
    let audio = Bytes::from(audio);
    let len = audio.len();
    let chunks: Vec<Result<Bytes, _>> = (0..len)
        .step_by(chunk_size)
        .map(|start| Ok(audio.slice(start..(start + chunk_size).min(len))))
        .collect();
    stream::iter(chunks).boxed()
}

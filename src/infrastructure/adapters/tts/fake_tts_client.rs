//! Fake TTS Client - 用于测试的 TTS 客户端
//!
//! 由请求参数确定性地生成伪音频，不实际调用 TTS 服务

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{self, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::application::ports::{AudioStream, TtsEnginePort, TtsError};
use crate::domain::{SpeechRequest, Voice};

/// 故障注入方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FakeFailure {
    #[default]
    None,
    /// 连接阶段失败
    BeforeStream,
    /// 输出第一个分块后失败
    MidStream,
}

/// Fake TTS Client 配置
#[derive(Debug, Clone)]
pub struct FakeTtsClientConfig {
    /// 每个分块的字节数
    pub chunk_size: usize,
    /// 固定返回的音色目录
    pub voices: Vec<Voice>,
}

impl Default for FakeTtsClientConfig {
    fn default() -> Self {
        Self {
            chunk_size: 16,
            voices: vec![
                Voice::new("zh-CN-XiaoxiaoNeural", "Female", "zh-CN"),
                Voice::new("zh-CN-YunxiNeural", "Male", "zh-CN"),
                Voice::new("zh-HK-HiuMaanNeural", "Female", "zh-HK"),
                Voice::new("en-US-AriaNeural", "Female", "en-US"),
            ],
        }
    }
}

/// Fake TTS Client
///
/// 同一请求总是得到同样的字节，可注入故障
pub struct FakeTtsClient {
    config: FakeTtsClientConfig,
    failure: Mutex<FakeFailure>,
    synthesize_calls: AtomicUsize,
    list_voices_calls: AtomicUsize,
}

impl FakeTtsClient {
    pub fn new(config: FakeTtsClientConfig) -> Self {
        tracing::info!(
            chunk_size = config.chunk_size,
            voices = config.voices.len(),
            "FakeTtsClient initialized"
        );
        Self {
            config,
            failure: Mutex::new(FakeFailure::None),
            synthesize_calls: AtomicUsize::new(0),
            list_voices_calls: AtomicUsize::new(0),
        }
    }

    /// 使用默认配置创建
    pub fn with_defaults() -> Self {
        Self::new(FakeTtsClientConfig::default())
    }

    /// 设置后续调用的故障方式
    pub fn set_failure(&self, failure: FakeFailure) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = failure;
    }

    fn failure(&self) -> FakeFailure {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn synthesize_calls(&self) -> usize {
        self.synthesize_calls.load(Ordering::SeqCst)
    }

    pub fn list_voices_calls(&self) -> usize {
        self.list_voices_calls.load(Ordering::SeqCst)
    }

    /// 请求对应的伪音频字节
    pub fn audio_for(request: &SpeechRequest) -> Vec<u8> {
        format!(
            "FAKEAUDIO|{}|{}|{}|{}|{}",
            request.voice,
            request.rate,
            request.volume,
            request.pitch,
            request.normalized_text()
        )
        .into_bytes()
    }
}

#[async_trait]
impl TtsEnginePort for FakeTtsClient {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<AudioStream, TtsError> {
        self.synthesize_calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            text_len = request.text.chars().count(),
            voice = %request.voice,
            "FakeTtsClient: generating audio"
        );

        let failure = self.failure();
        if failure == FakeFailure::BeforeStream {
            return Err(TtsError::NetworkError("connection refused".to_string()));
        }

        let audio = Self::audio_for(request);
        let mut chunks: Vec<Result<Bytes, TtsError>> = audio
            .chunks(self.config.chunk_size.max(1))
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();

        if failure == FakeFailure::MidStream {
            chunks.truncate(1);
            chunks.push(Err(TtsError::NetworkError("connection reset".to_string())));
        }

        Ok(stream::iter(chunks).boxed())
    }

    async fn list_voices(&self) -> Result<Vec<Voice>, TtsError> {
        self.list_voices_calls.fetch_add(1, Ordering::SeqCst);
        if self.failure() == FakeFailure::BeforeStream {
            return Err(TtsError::NetworkError("connection refused".to_string()));
        }
        Ok(self.config.voices.clone())
    }

    async fn health_check(&self) -> bool {
        self.failure() == FakeFailure::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;

    #[tokio::test]
    async fn test_audio_is_deterministic_and_chunked() {
        let client = FakeTtsClient::with_defaults();
        let request = SpeechRequest::new("你好，世界", "zh-CN-XiaoxiaoNeural");

        let chunks: Vec<Bytes> = client
            .synthesize(&request)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert!(chunks.len() > 1);
        assert_eq!(chunks.concat(), FakeTtsClient::audio_for(&request));
        assert_eq!(client.synthesize_calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let client = FakeTtsClient::with_defaults();
        let request = SpeechRequest::new("你好，世界，今天天气很好", "zh-CN-XiaoxiaoNeural");

        client.set_failure(FakeFailure::BeforeStream);
        assert!(client.synthesize(&request).await.is_err());
        assert!(client.list_voices().await.is_err());

        client.set_failure(FakeFailure::MidStream);
        let items: Vec<_> = client.synthesize(&request).await.unwrap().collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(items[1].is_err());
    }
}

//! HTTP TTS Client - 调用外部 TTS HTTP 服务
//!
//! 实现 TtsEnginePort trait，通过 HTTP 调用外部合成服务
//!
//! 外部 TTS API:
//! POST {base_url}/synthesize
//! Request: {"text": "...", "voice": "...", "rate": "+0%", "volume": "+0%", "pitch": "+0Hz"}
//! Response: audio/mpeg，分块传输
//!
//! GET {base_url}/voices
//! Response: [{"Name": "...", "ShortName": "...", "Gender": "...", "Locale": "..."}]

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{AudioStream, TtsEnginePort, TtsError};
use crate::domain::{SpeechRequest, Voice};

/// 合成请求体 (JSON)
#[derive(Debug, Serialize)]
struct SynthesizeHttpRequest<'a> {
    text: &'a str,
    voice: &'a str,
    rate: &'a str,
    volume: &'a str,
    pitch: &'a str,
}

/// HTTP TTS 客户端配置
#[derive(Debug, Clone)]
pub struct HttpTtsClientConfig {
    /// TTS 服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpTtsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5050".to_string(),
            timeout_secs: 60,
        }
    }
}

impl HttpTtsClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP TTS 客户端
pub struct HttpTtsClient {
    client: Client,
    config: HttpTtsClientConfig,
}

impl HttpTtsClient {
    /// 创建新的 HTTP TTS 客户端
    pub fn new(config: HttpTtsClientConfig) -> Result<Self, TtsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn synthesize_url(&self) -> String {
        format!("{}/synthesize", self.base_url())
    }

    fn voices_url(&self) -> String {
        format!("{}/voices", self.base_url())
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.base_url())
    }
}

/// reqwest 错误映射
fn map_request_error(e: reqwest::Error) -> TtsError {
    if e.is_timeout() {
        TtsError::Timeout
    } else if e.is_connect() {
        TtsError::NetworkError(format!("Cannot connect to TTS service: {}", e))
    } else {
        TtsError::NetworkError(e.to_string())
    }
}

/// 非 2xx 响应映射为 ServiceError
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, TtsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_text = response.text().await.unwrap_or_default();
    Err(TtsError::ServiceError(format!("HTTP {}: {}", status, error_text)))
}

#[async_trait]
impl TtsEnginePort for HttpTtsClient {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<AudioStream, TtsError> {
        let http_request = SynthesizeHttpRequest {
            text: &request.text,
            voice: &request.voice,
            rate: &request.rate,
            volume: &request.volume,
            pitch: &request.pitch,
        };

        tracing::debug!(
            url = %self.synthesize_url(),
            text_len = request.text.chars().count(),
            voice = %request.voice,
            "Sending TTS synthesize request"
        );

        let response = self
            .client
            .post(self.synthesize_url())
            .json(&http_request)
            .send()
            .await
            .map_err(map_request_error)?;
        let response = ensure_success(response).await?;

        let stream = response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout
                } else {
                    TtsError::NetworkError(format!("Audio stream interrupted: {}", e))
                }
            })
        });

        Ok(stream.boxed())
    }

    async fn list_voices(&self) -> Result<Vec<Voice>, TtsError> {
        let response = self
            .client
            .get(self.voices_url())
            .send()
            .await
            .map_err(map_request_error)?;
        let response = ensure_success(response).await?;

        let voices: Vec<Voice> = response
            .json()
            .await
            .map_err(|e| TtsError::InvalidResponse(format!("Failed to parse voices: {}", e)))?;

        tracing::info!(count = voices.len(), "Fetched voice catalog");
        Ok(voices)
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

//! TTS Engine Port - 语音合成后端抽象
//!
//! 定义合成后端的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use thiserror::Error;

use crate::domain::{SpeechRequest, Voice};

/// TTS 错误
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 有序音频分块流
pub type AudioStream = BoxStream<'static, Result<Bytes, TtsError>>;

/// TTS Engine Port
///
/// 外部合成服务的抽象接口，不做重试：失败只上报一次
#[async_trait]
pub trait TtsEnginePort: Send + Sync {
    /// 合成语音
    ///
    /// 连接失败等在开始传输前发生的错误直接返回 Err；
    /// 传输中途的错误作为流中的 Err 元素出现
    async fn synthesize(&self, request: &SpeechRequest) -> Result<AudioStream, TtsError>;

    /// 获取完整音色目录
    async fn list_voices(&self) -> Result<Vec<Voice>, TtsError>;

    /// 检查合成服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}

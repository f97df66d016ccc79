//! 语音合成请求
//!
//! 合成请求是缓存指纹、合成后端调用和缓存诊断信息的共同输入

use serde::{Deserialize, Serialize};

/// 默认语速
pub const DEFAULT_RATE: &str = "+0%";
/// 默认音量
pub const DEFAULT_VOLUME: &str = "+0%";
/// 默认音调
pub const DEFAULT_PITCH: &str = "+0Hz";

fn default_rate() -> String {
    DEFAULT_RATE.to_string()
}

fn default_volume() -> String {
    DEFAULT_VOLUME.to_string()
}

fn default_pitch() -> String {
    DEFAULT_PITCH.to_string()
}

/// 语音合成请求
///
/// 韵律参数沿用合成服务的字符串格式，例如 `+20%`、`-5Hz`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: String,
    #[serde(default = "default_rate")]
    pub rate: String,
    #[serde(default = "default_volume")]
    pub volume: String,
    #[serde(default = "default_pitch")]
    pub pitch: String,
}

impl SpeechRequest {
    /// 使用默认韵律参数创建请求
    pub fn new(text: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: voice.into(),
            rate: default_rate(),
            volume: default_volume(),
            pitch: default_pitch(),
        }
    }

    pub fn with_rate(mut self, rate: impl Into<String>) -> Self {
        self.rate = rate.into();
        self
    }

    pub fn with_volume(mut self, volume: impl Into<String>) -> Self {
        self.volume = volume.into();
        self
    }

    pub fn with_pitch(mut self, pitch: impl Into<String>) -> Self {
        self.pitch = pitch.into();
        self
    }

    /// 去除首尾空白后的文本（指纹只认这一形式）
    pub fn normalized_text(&self) -> &str {
        self.text.trim()
    }

    /// 请求参数摘要，仅用于诊断
    pub fn digest(&self) -> RequestDigest {
        RequestDigest {
            text_length: self.text.chars().count(),
            voice: self.voice.clone(),
            rate: self.rate.clone(),
            volume: self.volume.clone(),
            pitch: self.pitch.clone(),
        }
    }
}

/// 请求参数摘要
///
/// 冗余保存在缓存元数据中，便于排查，不参与查找
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDigest {
    pub text_length: usize,
    pub voice: String,
    pub rate: String,
    pub volume: String,
    pub pitch: String,
}

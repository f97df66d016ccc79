//! Data Transfer Objects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::ports::SegmentMode;
use crate::application::{PreloadCacheResponse, SegmentTextResponse};
use crate::domain::{SentenceSegment, SessionMetadata, SessionRecord, SpeechRequest};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Speech DTOs
// ============================================================================

fn default_true() -> bool {
    true
}

/// 语音生成请求
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(flatten)]
    pub speech: SpeechRequest,
    #[serde(default = "default_true")]
    pub use_cache: bool,
}

/// 缓存预加载请求
#[derive(Debug, Deserialize)]
pub struct PreloadRequest {
    #[serde(flatten)]
    pub speech: SpeechRequest,
    #[serde(default)]
    pub ttl_hours: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct PreloadResponse {
    pub cached: bool,
    pub already_cached: bool,
}

impl From<PreloadCacheResponse> for PreloadResponse {
    fn from(r: PreloadCacheResponse) -> Self {
        Self {
            cached: r.cached,
            already_cached: r.already_cached,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub removed: usize,
}

// ============================================================================
// Segment DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SegmentRequest {
    pub text: String,
    #[serde(default = "default_mode")]
    pub mode: String,
}

fn default_mode() -> String {
    SegmentMode::default().to_string()
}

#[derive(Debug, Serialize)]
pub struct SegmentResponse {
    pub text: String,
    pub mode: SegmentMode,
    pub words: Vec<String>,
    pub count: usize,
}

impl From<SegmentTextResponse> for SegmentResponse {
    fn from(r: SegmentTextResponse) -> Self {
        Self {
            count: r.words.len(),
            text: r.text,
            mode: r.mode,
            words: r.words,
        }
    }
}

// ============================================================================
// Session DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub text: String,
    pub voice: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ttl_hours: Option<f64>,
    #[serde(default)]
    pub metadata: SessionMetadata,
    #[serde(default)]
    pub persistent: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub text: String,
    pub voice: String,
    pub name: Option<String>,
    pub metadata: SessionMetadata,
    pub sentences: Option<Vec<SentenceSegment>>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub persistent: bool,
}

impl From<SessionRecord> for SessionResponse {
    fn from(record: SessionRecord) -> Self {
        Self {
            expires_at: record.expires_at(),
            persistent: record.is_persistent(),
            session_id: record.id,
            text: record.text,
            voice: record.voice,
            name: record.name,
            metadata: record.metadata,
            sentences: record.sentences,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteSessionResponse {
    pub session_id: String,
    pub deleted: bool,
}

// ============================================================================
// Service info
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub status: &'static str,
    pub version: &'static str,
    pub tts_available: bool,
}

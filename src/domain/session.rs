//! 会话记录
//!
//! 会话保存用户提交的文本、音色和分句结果，避免在 URL 中传递大段文本。
//! 存储层级在创建时确定：临时会话带过期时间，持久会话永不过期。

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// 会话开放扩展字段
pub type SessionMetadata = BTreeMap<String, serde_json::Value>;

/// 会话存储层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum SessionTier {
    /// 进程内存储，到期后失效
    Transient { expires_at: DateTime<Utc> },
    /// 外部持久存储，永不过期
    Persistent,
}

/// 单句分词结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceSegment {
    pub sentence: String,
    pub words: Vec<String>,
}

/// 会话记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub text: String,
    pub voice: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub metadata: SessionMetadata,
    #[serde(default)]
    pub sentences: Option<Vec<SentenceSegment>>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub tier: SessionTier,
}

impl SessionRecord {
    /// 创建临时会话，`ttl` 为零或负数时立即过期，溢出时取最大时间
    pub fn transient(draft: SessionDraft, now: DateTime<Utc>, ttl: Duration) -> Self {
        let expires_at = now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::build(draft, now, SessionTier::Transient { expires_at })
    }

    /// 创建持久会话
    pub fn persistent(draft: SessionDraft, now: DateTime<Utc>) -> Self {
        Self::build(draft, now, SessionTier::Persistent)
    }

    fn build(draft: SessionDraft, now: DateTime<Utc>, tier: SessionTier) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: draft.text,
            voice: draft.voice,
            name: draft.name,
            metadata: draft.metadata,
            sentences: None,
            created_at: now,
            tier,
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self.tier, SessionTier::Persistent)
    }

    /// 过期时间，持久会话为 None
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self.tier {
            SessionTier::Transient { expires_at } => Some(expires_at),
            SessionTier::Persistent => None,
        }
    }

    /// 判断是否过期（到达过期时间即视为过期）
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.tier {
            SessionTier::Transient { expires_at } => now >= expires_at,
            SessionTier::Persistent => false,
        }
    }

    /// 应用更新：整体替换分句结果，按 key 合并元数据
    pub fn apply(&mut self, update: SessionUpdate) {
        if let Some(sentences) = update.sentences {
            self.sentences = Some(sentences);
        }
        if let Some(metadata) = update.metadata {
            self.metadata.extend(metadata);
        }
    }
}

/// 创建会话所需的用户数据
#[derive(Debug, Clone, Default)]
pub struct SessionDraft {
    pub text: String,
    pub voice: String,
    pub name: Option<String>,
    pub metadata: SessionMetadata,
}

impl SessionDraft {
    pub fn new(text: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: voice.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_metadata(mut self, metadata: SessionMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// 会话更新
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub sentences: Option<Vec<SentenceSegment>>,
    pub metadata: Option<SessionMetadata>,
}

impl SessionUpdate {
    pub fn sentences(sentences: Vec<SentenceSegment>) -> Self {
        Self {
            sentences: Some(sentences),
            metadata: None,
        }
    }

    pub fn metadata(metadata: SessionMetadata) -> Self {
        Self {
            sentences: None,
            metadata: Some(metadata),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transient_expiry() {
        let now = Utc::now();
        let record = SessionRecord::transient(SessionDraft::new("文本", "v"), now, Duration::hours(1));
        assert!(!record.is_expired(now));
        assert!(record.is_expired(now + Duration::hours(2)));
        assert_eq!(record.expires_at(), Some(now + Duration::hours(1)));
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let now = Utc::now();
        let record = SessionRecord::transient(SessionDraft::new("文本", "v"), now, Duration::zero());
        assert!(record.is_expired(now));
    }

    #[test]
    fn test_overflowing_ttl_saturates() {
        let now = Utc::now();
        let record = SessionRecord::transient(
            SessionDraft::new("文本", "v"),
            now,
            Duration::days(100_000_000),
        );
        assert_eq!(record.expires_at(), Some(DateTime::<Utc>::MAX_UTC));
        assert!(!record.is_expired(now + Duration::days(3650)));
    }

    #[test]
    fn test_persistent_never_expires() {
        let now = Utc::now();
        let record = SessionRecord::persistent(SessionDraft::new("文本", "v"), now);
        assert!(record.is_persistent());
        assert!(!record.is_expired(now + Duration::days(3650)));
        assert_eq!(record.expires_at(), None);
    }

    #[test]
    fn test_apply_merges_metadata() {
        let mut metadata = SessionMetadata::new();
        metadata.insert("a".into(), json!(1));
        metadata.insert("b".into(), json!("x"));
        let mut record = SessionRecord::persistent(
            SessionDraft::new("文本", "v").with_metadata(metadata),
            Utc::now(),
        );

        let mut patch = SessionMetadata::new();
        patch.insert("b".into(), json!("y"));
        patch.insert("c".into(), json!(true));
        record.apply(SessionUpdate::metadata(patch));

        assert_eq!(record.metadata["a"], json!(1));
        assert_eq!(record.metadata["b"], json!("y"));
        assert_eq!(record.metadata["c"], json!(true));
        assert!(record.sentences.is_none());
    }

    #[test]
    fn test_json_round_trip_keeps_tier() {
        let record = SessionRecord::transient(SessionDraft::new("文本", "v"), Utc::now(), Duration::hours(1));
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"tier\":\"transient\""));
        let back: SessionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}

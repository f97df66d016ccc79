//! Session Command Handlers

use std::sync::Arc;

use crate::application::commands::session_commands::*;
use crate::application::error::{ensure_not_blank, hours_to_duration, ApplicationError};
use crate::application::ports::{
    SegmentMode, SessionManagerPort, TextSegmenterPort, TierRequest,
};
use crate::application::services::VoiceDirectory;
use crate::domain::{
    clean_text, clean_words, split_sentences, SentenceSegment, SessionDraft, SessionUpdate,
};

/// 分句并分词：每句精确模式分词，只保留汉字，丢弃无词的句子
pub fn segment_sentences(
    segmenter: &dyn TextSegmenterPort,
    text: &str,
) -> Vec<SentenceSegment> {
    split_sentences(text)
        .into_iter()
        .filter_map(|sentence| {
            let words = clean_words(&segmenter.segment(&sentence, SegmentMode::Precise));
            (!words.is_empty()).then_some(SentenceSegment { sentence, words })
        })
        .collect()
}

/// CreateSession Handler - 创建会话
pub struct CreateSessionHandler {
    session_manager: Arc<dyn SessionManagerPort>,
    voices: Arc<VoiceDirectory>,
}

impl CreateSessionHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>, voices: Arc<VoiceDirectory>) -> Self {
        Self {
            session_manager,
            voices,
        }
    }

    pub async fn handle(&self, cmd: CreateSessionCommand) -> Result<SessionResponse, ApplicationError> {
        ensure_not_blank("text", &cmd.text)?;
        ensure_not_blank("voice", &cmd.voice)?;

        let tier = if cmd.persistent {
            TierRequest::Persistent
        } else {
            let ttl = cmd
                .ttl_hours
                .map(|hours| hours_to_duration("ttl_hours", hours))
                .transpose()?;
            TierRequest::Transient { ttl }
        };

        self.voices.ensure_valid(&cmd.voice).await?;

        let mut draft = SessionDraft::new(clean_text(&cmd.text), cmd.voice).with_metadata(cmd.metadata);
        if let Some(name) = cmd.name {
            draft = draft.with_name(name);
        }

        let record = self.session_manager.create(draft, tier).await?;
        Ok(record)
    }
}

/// SegmentSession Handler - 对会话文本分句并保存结果
pub struct SegmentSessionHandler {
    session_manager: Arc<dyn SessionManagerPort>,
    segmenter: Arc<dyn TextSegmenterPort>,
}

impl SegmentSessionHandler {
    pub fn new(
        session_manager: Arc<dyn SessionManagerPort>,
        segmenter: Arc<dyn TextSegmenterPort>,
    ) -> Self {
        Self {
            session_manager,
            segmenter,
        }
    }

    pub async fn handle(
        &self,
        cmd: SegmentSessionCommand,
    ) -> Result<SessionResponse, ApplicationError> {
        let session = self
            .session_manager
            .get(&cmd.session_id)
            .await
            .ok_or_else(|| ApplicationError::not_found("Session", &cmd.session_id))?;

        let sentences = segment_sentences(self.segmenter.as_ref(), &session.text);

        tracing::info!(
            session_id = %cmd.session_id,
            sentences = sentences.len(),
            "Session text segmented"
        );

        let record = self
            .session_manager
            .update(&cmd.session_id, SessionUpdate::sentences(sentences))
            .await?;
        Ok(record)
    }
}

/// DeleteSession Handler - 删除会话
pub struct DeleteSessionHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl DeleteSessionHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(
        &self,
        cmd: DeleteSessionCommand,
    ) -> Result<DeleteSessionResponse, ApplicationError> {
        if !self.session_manager.delete(&cmd.session_id).await {
            return Err(ApplicationError::not_found("Session", cmd.session_id));
        }
        Ok(DeleteSessionResponse {
            session_id: cmd.session_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::DEFAULT_CATALOG_TTL;
    use crate::infrastructure::adapters::{FakeTtsClient, JiebaTokenizer};
    use crate::infrastructure::memory::{
        HybridSessionStore, InMemoryKeyValueStore, SessionStoreConfig,
    };

    struct Fixture {
        sessions: Arc<HybridSessionStore>,
        create: CreateSessionHandler,
        segment: SegmentSessionHandler,
        delete: DeleteSessionHandler,
    }

    fn fixture() -> Fixture {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let sessions =
            Arc::new(HybridSessionStore::new(SessionStoreConfig::default(), Some(kv)));
        let tts = Arc::new(FakeTtsClient::with_defaults());
        let voices = Arc::new(VoiceDirectory::new(tts, DEFAULT_CATALOG_TTL));
        let segmenter = Arc::new(JiebaTokenizer::new());

        Fixture {
            create: CreateSessionHandler::new(sessions.clone(), voices),
            segment: SegmentSessionHandler::new(sessions.clone(), segmenter),
            delete: DeleteSessionHandler::new(sessions.clone()),
            sessions,
        }
    }

    fn create_cmd(persistent: bool) -> CreateSessionCommand {
        CreateSessionCommand {
            text: "你好，今天天气很好。\n我们去公园玩吧。".to_string(),
            voice: "zh-HK-HiuMaanNeural".to_string(),
            persistent,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_segment_session() {
        for persistent in [false, true] {
            let f = fixture();
            let record = f.create.handle(create_cmd(persistent)).await.unwrap();
            assert_eq!(record.is_persistent(), persistent);

            let segmented = f
                .segment
                .handle(SegmentSessionCommand {
                    session_id: record.id.clone(),
                })
                .await
                .unwrap();

            let sentences = segmented.sentences.unwrap();
            assert_eq!(sentences.len(), 2);
            assert_eq!(sentences[0].sentence, "你好，今天天气很好。");
            assert_eq!(sentences[1].sentence, "我们去公园玩吧。");
            assert!(sentences.iter().all(|s| !s.words.is_empty()));
            assert!(sentences
                .iter()
                .flat_map(|s| s.words.iter())
                .all(|w| !w.contains('，') && !w.contains('。')));

            let fetched = f.sessions.get(&record.id).await.unwrap();
            assert_eq!(fetched.sentences, Some(sentences));
        }
    }

    #[tokio::test]
    async fn test_sentences_without_chinese_are_dropped() {
        let segmenter = JiebaTokenizer::new();
        let sentences = segment_sentences(&segmenter, "Hello world!\n你好。\n123。");
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].sentence, "你好。");
        assert_eq!(sentences[0].words, vec!["你好"]);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_voice() {
        let f = fixture();
        let mut cmd = create_cmd(false);
        cmd.voice = "xx-XX-Nobody".to_string();
        assert!(matches!(
            f.create.handle(cmd).await,
            Err(ApplicationError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_zero_ttl_session_is_gone() {
        let f = fixture();
        let mut cmd = create_cmd(false);
        cmd.ttl_hours = Some(0.0);
        let record = f.create.handle(cmd).await.unwrap();

        assert!(f.sessions.get(&record.id).await.is_none());
        let result = f
            .segment
            .handle(SegmentSessionCommand {
                session_id: record.id,
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_create_rejects_unrepresentable_ttl() {
        let f = fixture();
        for hours in [5e9, 1e13, f64::INFINITY] {
            let mut cmd = create_cmd(false);
            cmd.ttl_hours = Some(hours);
            assert!(matches!(
                f.create.handle(cmd).await,
                Err(ApplicationError::ValidationError(_))
            ));
        }
        assert_eq!(f.sessions.stats().await.in_memory_sessions, 0);
    }

    #[tokio::test]
    async fn test_create_keeps_name_and_metadata() {
        let f = fixture();
        let mut cmd = create_cmd(false);
        cmd.name = Some("第一章".to_string());
        cmd.metadata
            .insert("chapter".to_string(), serde_json::json!(1));

        let record = f.create.handle(cmd).await.unwrap();
        assert_eq!(record.name.as_deref(), Some("第一章"));
        assert_eq!(record.metadata["chapter"], serde_json::json!(1));
    }

    #[tokio::test]
    async fn test_delete_session() {
        let f = fixture();
        let record = f.create.handle(create_cmd(true)).await.unwrap();

        f.delete
            .handle(DeleteSessionCommand {
                session_id: record.id.clone(),
            })
            .await
            .unwrap();
        let again = f
            .delete
            .handle(DeleteSessionCommand {
                session_id: record.id,
            })
            .await;
        assert!(matches!(again, Err(ApplicationError::NotFound { .. })));
    }
}

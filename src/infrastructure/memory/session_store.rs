//! Hybrid Session Store Implementation
//!
//! 临时会话保存在进程内 HashMap，持久会话以 JSON 写入外部 KV 存储。
//! 后台清理任务定期移除过期的临时会话。

use async_trait::async_trait;
use chrono::Duration;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, Weak};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    system_clock, KeyValueStorePort, SessionError, SessionManagerPort, SessionStats, SharedClock,
    StoreError, TierRequest,
};
use crate::domain::{SessionDraft, SessionRecord, SessionUpdate};

/// 持久会话 key 前缀
pub const PERSISTENT_KEY_PREFIX: &str = "persistent_session:";

fn persistent_key(id: &str) -> String {
    format!("{}{}", PERSISTENT_KEY_PREFIX, id)
}

/// 会话存储配置
#[derive(Debug, Clone)]
pub struct SessionStoreConfig {
    /// 临时会话默认 TTL
    pub default_ttl: Duration,
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::hours(1),
        }
    }
}

/// 清理任务句柄
struct CleanupTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// 双层会话存储
pub struct HybridSessionStore {
    transient: Mutex<HashMap<String, SessionRecord>>,
    persistent: Option<Arc<dyn KeyValueStorePort>>,
    default_ttl: Duration,
    clock: SharedClock,
    cleanup_task: StdMutex<Option<CleanupTask>>,
}

impl HybridSessionStore {
    pub fn new(config: SessionStoreConfig, persistent: Option<Arc<dyn KeyValueStorePort>>) -> Self {
        Self::with_clock(config, persistent, system_clock())
    }

    pub fn with_clock(
        config: SessionStoreConfig,
        persistent: Option<Arc<dyn KeyValueStorePort>>,
        clock: SharedClock,
    ) -> Self {
        tracing::info!(
            default_ttl_secs = config.default_ttl.num_seconds(),
            persistent_enabled = persistent.is_some(),
            "HybridSessionStore initialized"
        );
        Self {
            transient: Mutex::new(HashMap::new()),
            persistent,
            default_ttl: config.default_ttl,
            clock,
            cleanup_task: StdMutex::new(None),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn persistent_enabled(&self) -> bool {
        self.persistent.is_some()
    }

    fn store(&self) -> Result<&Arc<dyn KeyValueStorePort>, SessionError> {
        self.persistent
            .as_ref()
            .ok_or(SessionError::PersistentTierDisabled)
    }

    async fn save_persistent(&self, record: &SessionRecord) -> Result<(), SessionError> {
        let store = self.store()?;
        let json = serde_json::to_string(record)
            .map_err(|e| SessionError::Serialization(e.to_string()))?;
        store
            .set(&persistent_key(&record.id), json)
            .await
            .map_err(store_err)
    }

    async fn load_persistent(&self, id: &str) -> Result<Option<SessionRecord>, SessionError> {
        let Some(store) = self.persistent.as_ref() else {
            return Ok(None);
        };
        let Some(json) = store.get(&persistent_key(id)).await.map_err(store_err)? else {
            return Ok(None);
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| SessionError::Serialization(e.to_string()))
    }

    /// 删除所有持久会话，返回删除数量
    pub async fn clear_persistent(&self) -> Result<usize, SessionError> {
        let store = self.store()?;
        let keys = store
            .list_keys(PERSISTENT_KEY_PREFIX)
            .await
            .map_err(store_err)?;

        let mut removed = 0;
        for key in &keys {
            if store.delete(key).await.map_err(store_err)? {
                removed += 1;
            }
        }

        tracing::info!(removed = removed, "Cleared persistent sessions");
        Ok(removed)
    }

    /// 启动后台清理任务；已启动时不重复启动
    pub fn start_cleanup_task(self: &Arc<Self>, interval: std::time::Duration) {
        let mut slot = self.cleanup_task.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_some() {
            return;
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let store: Weak<Self> = Arc::downgrade(self);

        let handle = tokio::spawn(async move {
            tracing::info!(interval_secs = interval.as_secs(), "Session cleanup task started");
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }

                let Some(store) = store.upgrade() else {
                    break;
                };
                let removed = store.cleanup_expired().await;
                if removed > 0 {
                    tracing::info!(removed = removed, "Cleaned up expired sessions");
                }
            }
            tracing::info!("Session cleanup task stopped");
        });

        *slot = Some(CleanupTask { cancel, handle });
    }

    /// 停止后台清理任务并等待其退出
    pub async fn stop_cleanup_task(&self) {
        let task = self
            .cleanup_task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        if let Some(task) = task {
            task.cancel.cancel();
            if let Err(e) = task.handle.await {
                tracing::error!(error = %e, "Session cleanup task panicked");
            }
        }
    }
}

fn store_err(e: StoreError) -> SessionError {
    SessionError::Store(e.to_string())
}

impl Drop for HybridSessionStore {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.cleanup_task.lock() {
            if let Some(task) = slot.take() {
                task.cancel.cancel();
            }
        }
    }
}

#[async_trait]
impl SessionManagerPort for HybridSessionStore {
    async fn create(
        &self,
        draft: SessionDraft,
        tier: TierRequest,
    ) -> Result<SessionRecord, SessionError> {
        let now = self.clock.now();

        let record = match tier {
            TierRequest::Transient { ttl } => {
                let record =
                    SessionRecord::transient(draft, now, ttl.unwrap_or(self.default_ttl));
                self.transient
                    .lock()
                    .await
                    .insert(record.id.clone(), record.clone());
                record
            }
            TierRequest::Persistent => {
                let record = SessionRecord::persistent(draft, now);
                self.save_persistent(&record).await?;
                record
            }
        };

        tracing::info!(
            session_id = %record.id,
            persistent = record.is_persistent(),
            text_len = record.text.chars().count(),
            "Session created"
        );
        Ok(record)
    }

    async fn get(&self, id: &str) -> Option<SessionRecord> {
        {
            let mut transient = self.transient.lock().await;
            let expired = transient.get(id).map(|r| r.is_expired(self.clock.now()));
            match expired {
                Some(true) => {
                    transient.remove(id);
                    tracing::debug!(session_id = %id, "Session expired");
                    return None;
                }
                Some(false) => return transient.get(id).cloned(),
                None => {}
            }
        }

        match self.load_persistent(id).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(session_id = %id, error = %e, "Failed to load persistent session");
                None
            }
        }
    }

    async fn update(
        &self,
        id: &str,
        update: SessionUpdate,
    ) -> Result<SessionRecord, SessionError> {
        {
            let mut transient = self.transient.lock().await;
            let expired = transient.get(id).map(|r| r.is_expired(self.clock.now()));
            match expired {
                Some(true) => {
                    transient.remove(id);
                    return Err(SessionError::Expired(id.to_string()));
                }
                Some(false) => {
                    let record = transient
                        .get_mut(id)
                        .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
                    record.apply(update);
                    tracing::debug!(session_id = %id, "Session updated");
                    return Ok(record.clone());
                }
                None => {}
            }
        }

        // 持久会话：读-改-写，并发更新以最后一次写入为准
        let mut record = self
            .load_persistent(id)
            .await?
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        record.apply(update);
        self.save_persistent(&record).await?;

        tracing::debug!(session_id = %id, "Persistent session updated");
        Ok(record)
    }

    async fn delete(&self, id: &str) -> bool {
        let removed_transient = self.transient.lock().await.remove(id).is_some();

        let removed_persistent = match self.persistent.as_ref() {
            Some(store) => match store.delete(&persistent_key(id)).await {
                Ok(removed) => removed,
                Err(e) => {
                    tracing::warn!(session_id = %id, error = %e, "Failed to delete persistent session");
                    false
                }
            },
            None => false,
        };

        let removed = removed_transient || removed_persistent;
        if removed {
            tracing::info!(session_id = %id, "Session deleted");
        }
        removed
    }

    async fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let mut transient = self.transient.lock().await;
        let before = transient.len();
        transient.retain(|_, record| !record.is_expired(now));
        before - transient.len()
    }

    async fn stats(&self) -> SessionStats {
        let now = self.clock.now();
        let (in_memory, expired) = {
            let transient = self.transient.lock().await;
            let expired = transient.values().filter(|r| r.is_expired(now)).count();
            (transient.len(), expired)
        };

        let persistent = match self.persistent.as_ref() {
            Some(store) => store.count(PERSISTENT_KEY_PREFIX).await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to count persistent sessions");
                0
            }),
            None => 0,
        };

        SessionStats {
            in_memory_sessions: in_memory,
            active_sessions: in_memory - expired,
            expired_sessions: expired,
            persistent_sessions: persistent,
            total_sessions: in_memory + persistent,
            default_ttl_hours: self.default_ttl.num_seconds() as f64 / 3600.0,
            persistent_enabled: self.persistent.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::ManualClock;
    use crate::domain::{SentenceSegment, SessionMetadata};
    use crate::infrastructure::memory::InMemoryKeyValueStore;
    use futures_util::future::join_all;
    use serde_json::json;

    fn store_with(
        kv: Option<Arc<InMemoryKeyValueStore>>,
    ) -> (HybridSessionStore, Arc<ManualClock>) {
        let clock = ManualClock::starting_now();
        let persistent = kv.map(|kv| kv as Arc<dyn KeyValueStorePort>);
        let store =
            HybridSessionStore::with_clock(SessionStoreConfig::default(), persistent, clock.clone());
        (store, clock)
    }

    fn draft() -> SessionDraft {
        SessionDraft::new("你好，今天天气很好。", "zh-CN-XiaoxiaoNeural")
    }

    #[tokio::test]
    async fn test_transient_session_lifecycle() {
        let (store, clock) = store_with(None);

        let record = store
            .create(draft(), TierRequest::Transient { ttl: None })
            .await
            .unwrap();
        assert!(!record.is_persistent());

        let fetched = store.get(&record.id).await.unwrap();
        assert_eq!(fetched.text, "你好，今天天气很好。");

        clock.advance(Duration::hours(2));
        assert!(store.get(&record.id).await.is_none());
        assert_eq!(store.stats().await.in_memory_sessions, 0);
    }

    #[tokio::test]
    async fn test_zero_ttl_session_is_absent() {
        let (store, _) = store_with(None);
        let record = store
            .create(draft(), TierRequest::Transient { ttl: Some(Duration::zero()) })
            .await
            .unwrap();
        assert!(store.get(&record.id).await.is_none());
    }

    #[tokio::test]
    async fn test_persistent_session_never_expires() {
        let kv = InMemoryKeyValueStore::new().arc();
        let (store, clock) = store_with(Some(kv.clone()));

        let record = store.create(draft(), TierRequest::Persistent).await.unwrap();
        assert!(kv.exists(&persistent_key(&record.id)).await.unwrap());

        clock.advance(Duration::days(365 * 10));
        let fetched = store.get(&record.id).await.unwrap();
        assert!(fetched.is_persistent());
        assert_eq!(fetched.voice, "zh-CN-XiaoxiaoNeural");
    }

    #[tokio::test]
    async fn test_persistent_without_store_is_rejected() {
        let (store, _) = store_with(None);
        let result = store.create(draft(), TierRequest::Persistent).await;
        assert!(matches!(result, Err(SessionError::PersistentTierDisabled)));
    }

    #[tokio::test]
    async fn test_update_transient_and_persistent() {
        let kv = InMemoryKeyValueStore::new().arc();
        let (store, _) = store_with(Some(kv));

        let sentences = vec![SentenceSegment {
            sentence: "你好。".into(),
            words: vec!["你好".into()],
        }];

        for tier in [TierRequest::Transient { ttl: None }, TierRequest::Persistent] {
            let record = store.create(draft(), tier).await.unwrap();
            let updated = store
                .update(&record.id, SessionUpdate::sentences(sentences.clone()))
                .await
                .unwrap();
            assert_eq!(updated.sentences.as_ref(), Some(&sentences));

            let fetched = store.get(&record.id).await.unwrap();
            assert_eq!(fetched.sentences, Some(sentences.clone()));
        }
    }

    #[tokio::test]
    async fn test_update_merges_metadata() {
        let (store, _) = store_with(None);
        let mut metadata = SessionMetadata::new();
        metadata.insert("chapter".into(), json!(1));
        let record = store
            .create(draft().with_metadata(metadata), TierRequest::Transient { ttl: None })
            .await
            .unwrap();

        let mut patch = SessionMetadata::new();
        patch.insert("position".into(), json!(42));
        let updated = store
            .update(&record.id, SessionUpdate::metadata(patch))
            .await
            .unwrap();
        assert_eq!(updated.metadata["chapter"], json!(1));
        assert_eq!(updated.metadata["position"], json!(42));
    }

    #[tokio::test]
    async fn test_update_missing_and_expired() {
        let (store, clock) = store_with(None);
        let result = store.update("missing", SessionUpdate::default()).await;
        assert!(matches!(result, Err(SessionError::NotFound(_))));

        let record = store
            .create(draft(), TierRequest::Transient { ttl: Some(Duration::minutes(1)) })
            .await
            .unwrap();
        clock.advance(Duration::minutes(2));
        let result = store.update(&record.id, SessionUpdate::default()).await;
        assert!(matches!(result, Err(SessionError::Expired(_))));
    }

    #[tokio::test]
    async fn test_delete_either_tier() {
        let kv = InMemoryKeyValueStore::new().arc();
        let (store, _) = store_with(Some(kv));

        let transient = store
            .create(draft(), TierRequest::Transient { ttl: None })
            .await
            .unwrap();
        let persistent = store.create(draft(), TierRequest::Persistent).await.unwrap();

        assert!(store.delete(&transient.id).await);
        assert!(store.delete(&persistent.id).await);
        assert!(!store.delete(&persistent.id).await);
        assert!(store.get(&persistent.id).await.is_none());
    }

    #[tokio::test]
    async fn test_unavailable_store_degrades_to_absent() {
        let kv = InMemoryKeyValueStore::new().arc();
        let (store, _) = store_with(Some(kv.clone()));
        let record = store.create(draft(), TierRequest::Persistent).await.unwrap();

        kv.set_unavailable(true);
        assert!(store.get(&record.id).await.is_none());
        assert!(matches!(
            store.create(draft(), TierRequest::Persistent).await,
            Err(SessionError::Store(_))
        ));
        assert_eq!(store.stats().await.persistent_sessions, 0);

        // 临时会话不受影响
        let transient = store
            .create(draft(), TierRequest::Transient { ttl: None })
            .await
            .unwrap();
        assert!(store.get(&transient.id).await.is_some());
    }

    #[tokio::test]
    async fn test_cleanup_and_stats() {
        let kv = InMemoryKeyValueStore::new().arc();
        let (store, clock) = store_with(Some(kv));

        store
            .create(draft(), TierRequest::Transient { ttl: Some(Duration::minutes(5)) })
            .await
            .unwrap();
        store
            .create(draft(), TierRequest::Transient { ttl: Some(Duration::hours(5)) })
            .await
            .unwrap();
        store.create(draft(), TierRequest::Persistent).await.unwrap();

        clock.advance(Duration::minutes(10));
        let stats = store.stats().await;
        assert_eq!(stats.in_memory_sessions, 2);
        assert_eq!(stats.expired_sessions, 1);
        assert_eq!(stats.active_sessions, 1);
        assert_eq!(stats.persistent_sessions, 1);
        assert_eq!(stats.total_sessions, 3);
        assert_eq!(stats.default_ttl_hours, 1.0);
        assert!(stats.persistent_enabled);

        assert_eq!(store.cleanup_expired().await, 1);
        assert_eq!(store.cleanup_expired().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_create_get_and_sweep() {
        let kv = InMemoryKeyValueStore::new().arc();
        let (store, _clock) = store_with(Some(kv));
        let store = Arc::new(store);

        let tasks = (0..32).map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                let kind = i % 3;
                let tier = match kind {
                    0 => TierRequest::Persistent,
                    1 => TierRequest::Transient { ttl: Some(Duration::zero()) },
                    _ => TierRequest::Transient { ttl: Some(Duration::hours(1)) },
                };
                let record = store.create(draft(), tier).await.unwrap();
                store.cleanup_expired().await;
                let fetched = store.get(&record.id).await;
                (kind, record.id, fetched.map(|r| r.id))
            })
        });

        for result in join_all(tasks).await {
            let (kind, id, fetched) = result.unwrap();
            if kind == 1 {
                assert!(fetched.is_none());
            } else {
                assert_eq!(fetched, Some(id));
            }
        }

        assert_eq!(store.cleanup_expired().await, 0);
        let stats = store.stats().await;
        assert_eq!(stats.in_memory_sessions, 10);
        assert_eq!(stats.expired_sessions, 0);
        assert_eq!(stats.persistent_sessions, 11);
    }

    #[tokio::test]
    async fn test_clear_persistent() {
        let kv = InMemoryKeyValueStore::new().arc();
        let (store, _) = store_with(Some(kv.clone()));
        store.create(draft(), TierRequest::Persistent).await.unwrap();
        store.create(draft(), TierRequest::Persistent).await.unwrap();
        kv.set("unrelated", "x".into()).await.unwrap();

        assert_eq!(store.clear_persistent().await.unwrap(), 2);
        assert_eq!(kv.count("").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_sessions() {
        let clock = ManualClock::starting_now();
        let store = HybridSessionStore::with_clock(SessionStoreConfig::default(), None, clock.clone())
            .arc();
        store
            .create(draft(), TierRequest::Transient { ttl: Some(Duration::seconds(1)) })
            .await
            .unwrap();
        clock.advance(Duration::seconds(5));

        store.start_cleanup_task(std::time::Duration::from_millis(10));
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        store.stop_cleanup_task().await;

        assert_eq!(store.stats().await.in_memory_sessions, 0);
    }

    #[tokio::test]
    async fn test_stop_cleanup_task_is_idempotent() {
        let store = HybridSessionStore::new(SessionStoreConfig::default(), None).arc();
        store.start_cleanup_task(std::time::Duration::from_secs(300));
        store.stop_cleanup_task().await;
        store.stop_cleanup_task().await;
    }
}

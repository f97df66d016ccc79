//! File-based LRU + TTL Audio Cache Implementation
//!
//! 每个指纹一个音频文件 `{key}.mp3`，所有元数据保存在 `metadata.json`。
//! 元数据索引与容量检查-淘汰-写入序列共用一把锁。

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::sync::Mutex;

use crate::application::ports::{
    bytes_to_mb, generate_cache_key, short_key, system_clock, AudioCachePort, CacheEntry,
    CacheEntryInfo, CacheError, CacheStats, SharedClock,
};
use crate::domain::SpeechRequest;

const BLOB_EXT: &str = "mp3";
const PARTIAL_EXT: &str = "part";
const INDEX_FILE: &str = "metadata.json";

/// 文件缓存配置
#[derive(Debug, Clone)]
pub struct FileCacheConfig {
    /// 缓存目录
    pub cache_dir: PathBuf,
    /// 最大缓存大小（字节）
    pub max_size_bytes: u64,
    /// 默认 TTL
    pub default_ttl: Duration,
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache"),
            max_size_bytes: 500 * 1024 * 1024, // 500MB
            default_ttl: Duration::hours(24 * 7),
        }
    }
}

/// 持久化的命中统计
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct PersistedStats {
    hits: u64,
    misses: u64,
    total_requests: u64,
}

/// 索引文件（读取）
#[derive(Debug, Default, Deserialize)]
struct IndexFile {
    #[serde(default)]
    entries: HashMap<String, CacheEntry>,
    #[serde(default)]
    stats: PersistedStats,
    #[serde(default)]
    next_seq: u64,
}

/// 索引文件（写入）
#[derive(Serialize)]
struct IndexFileRef<'a> {
    entries: &'a HashMap<String, CacheEntry>,
    stats: PersistedStats,
    next_seq: u64,
    total_size_bytes: u64,
    last_updated: DateTime<Utc>,
}

/// 锁内状态
#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    total_size: u64,
    next_seq: u64,
}

impl CacheState {
    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

/// 文件系统音频缓存
pub struct FileAudioCache {
    cache_dir: PathBuf,
    max_size_bytes: u64,
    default_ttl: Duration,
    clock: SharedClock,
    state: Mutex<CacheState>,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
    request_count: AtomicU64,
}

impl FileAudioCache {
    /// 打开缓存目录，加载（或重建）元数据索引
    pub async fn open(config: &FileCacheConfig) -> Result<Self, CacheError> {
        Self::open_with_clock(config, system_clock()).await
    }

    pub async fn open_with_clock(
        config: &FileCacheConfig,
        clock: SharedClock,
    ) -> Result<Self, CacheError> {
        fs::create_dir_all(&config.cache_dir)
            .await
            .map_err(|e| CacheError::IoError(e.to_string()))?;

        let index = load_index(&config.cache_dir.join(INDEX_FILE)).await;
        let blobs = scan_blobs(&config.cache_dir).await?;
        let index_loaded = index.is_some();
        let IndexFile {
            entries,
            stats,
            next_seq,
        } = index.unwrap_or_default();

        let cache = Self {
            cache_dir: config.cache_dir.clone(),
            max_size_bytes: config.max_size_bytes,
            default_ttl: config.default_ttl,
            clock,
            state: Mutex::new(CacheState::default()),
            hit_count: AtomicU64::new(stats.hits),
            miss_count: AtomicU64::new(stats.misses),
            request_count: AtomicU64::new(stats.total_requests),
        };

        {
            let mut state = cache.state.lock().await;
            state.next_seq = next_seq;
            cache.reconcile(&mut state, entries, blobs);

            // 预算调小后，启动时先淘汰到预算以内
            if state.total_size > cache.max_size_bytes {
                cache.evict_for(&mut state, 0).await;
            }

            cache.save_index(&state).await?;

            tracing::info!(
                cache_dir = %cache.cache_dir.display(),
                max_size_bytes = cache.max_size_bytes,
                current_size = state.total_size,
                entries = state.entries.len(),
                index_loaded = index_loaded,
                "FileAudioCache initialized"
            );
        }

        Ok(cache)
    }

    /// 用文件扫描结果校正索引
    ///
    /// - 索引中有、文件不存在：丢弃条目
    /// - 文件存在、索引中没有：按文件信息补建条目
    /// - 大小以实际文件为准
    fn reconcile(
        &self,
        state: &mut CacheState,
        mut indexed: HashMap<String, CacheEntry>,
        blobs: HashMap<String, BlobInfo>,
    ) {
        let mut adopted: Vec<(String, BlobInfo)> = Vec::new();

        for (key, blob) in blobs {
            match indexed.remove(&key) {
                Some(mut entry) => {
                    entry.fingerprint = key.clone();
                    entry.size_bytes = blob.size;
                    state.next_seq = state.next_seq.max(entry.seq + 1);
                    state.total_size += blob.size;
                    state.entries.insert(key, entry);
                }
                None => adopted.push((key, blob)),
            }
        }

        if !indexed.is_empty() {
            tracing::warn!(
                dropped = indexed.len(),
                "Dropped index entries without cache files"
            );
        }

        // 补建条目按文件修改时间排序，保持 LRU 次序
        adopted.sort_by_key(|(_, blob)| blob.modified);
        let adopted_count = adopted.len();
        for (key, blob) in adopted {
            let seq = state.take_seq();
            let created_at = blob.modified.unwrap_or_else(|| self.clock.now());
            state.total_size += blob.size;
            state.entries.insert(
                key.clone(),
                CacheEntry {
                    fingerprint: key,
                    created_at,
                    last_accessed: created_at,
                    access_count: 0,
                    size_bytes: blob.size,
                    ttl_secs: self.default_ttl.num_seconds(),
                    seq,
                    source_params_digest: None,
                },
            );
        }

        if adopted_count > 0 {
            tracing::info!(adopted = adopted_count, "Rebuilt index entries from cache files");
        }
    }

    fn blob_path(&self, cache_key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.{}", cache_key, BLOB_EXT))
    }

    fn partial_path(&self, cache_key: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}.{}.{}", cache_key, BLOB_EXT, PARTIAL_EXT))
    }

    fn index_path(&self) -> PathBuf {
        self.cache_dir.join(INDEX_FILE)
    }

    /// 删除条目及其文件，返回被删除的条目
    async fn remove_entry(&self, state: &mut CacheState, cache_key: &str) -> Option<CacheEntry> {
        let entry = state.entries.remove(cache_key)?;
        state.total_size = state.total_size.saturating_sub(entry.size_bytes);

        if let Err(e) = fs::remove_file(self.blob_path(cache_key)).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::error!(
                    cache_key = %short_key(cache_key),
                    error = %e,
                    "Failed to remove cache file"
                );
            }
        }

        Some(entry)
    }

    /// LRU 淘汰，直到再写入 `incoming` 字节后不超过预算
    ///
    /// 按 (last_accessed, seq) 升序淘汰，返回淘汰数量
    async fn evict_for(&self, state: &mut CacheState, incoming: u64) -> usize {
        if state.total_size + incoming <= self.max_size_bytes {
            return 0;
        }

        let mut candidates: Vec<(DateTime<Utc>, u64, String)> = state
            .entries
            .values()
            .map(|e| (e.last_accessed, e.seq, e.fingerprint.clone()))
            .collect();
        candidates.sort();

        let mut evicted = 0;
        for (_, _, key) in candidates {
            if state.total_size + incoming <= self.max_size_bytes {
                break;
            }
            if let Some(entry) = self.remove_entry(state, &key).await {
                evicted += 1;
                tracing::info!(
                    cache_key = %short_key(&key),
                    size_bytes = entry.size_bytes,
                    "LRU evicted cache entry"
                );
            }
        }

        evicted
    }

    /// 原子写入索引文件（先写临时文件再重命名）
    async fn save_index(&self, state: &CacheState) -> Result<(), CacheError> {
        let file = IndexFileRef {
            entries: &state.entries,
            stats: PersistedStats {
                hits: self.hit_count.load(Ordering::Relaxed),
                misses: self.miss_count.load(Ordering::Relaxed),
                total_requests: self.request_count.load(Ordering::Relaxed),
            },
            next_seq: state.next_seq,
            total_size_bytes: state.total_size,
            last_updated: self.clock.now(),
        };
        let json = serde_json::to_vec_pretty(&file)
            .map_err(|e| CacheError::SerializationError(e.to_string()))?;

        let index_path = self.index_path();
        let tmp_path = index_path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .await
            .map_err(|e| CacheError::IoError(e.to_string()))?;
        fs::rename(&tmp_path, &index_path)
            .await
            .map_err(|e| CacheError::IoError(e.to_string()))?;

        Ok(())
    }

    /// 保存索引，失败只记录日志（用于删除类操作）
    async fn save_index_logged(&self, state: &CacheState) {
        if let Err(e) = self.save_index(state).await {
            tracing::error!(error = %e, "Failed to save cache metadata");
        }
    }

    /// 写入文件：临时文件 + 重命名，失败时清理残留
    async fn write_blob(&self, cache_key: &str, audio_data: &[u8]) -> Result<(), CacheError> {
        let partial = self.partial_path(cache_key);
        let target = self.blob_path(cache_key);

        let result = async {
            fs::write(&partial, audio_data).await?;
            fs::rename(&partial, &target).await
        }
        .await;

        if let Err(e) = result {
            let _ = fs::remove_file(&partial).await;
            let _ = fs::remove_file(&target).await;
            return Err(CacheError::IoError(e.to_string()));
        }

        Ok(())
    }

    /// 未命中计数
    fn record_miss(&self) {
        self.miss_count.fetch_add(1, Ordering::Relaxed);
    }

    /// 清理读取失败的条目（条目未被并发替换时）
    async fn purge_if_unchanged(&self, cache_key: &str, seq: u64) {
        let mut state = self.state.lock().await;
        let unchanged = state
            .entries
            .get(cache_key)
            .map(|e| e.seq == seq)
            .unwrap_or(false);
        if unchanged {
            self.remove_entry(&mut state, cache_key).await;
            self.save_index_logged(&state).await;
        }
    }

    /// 刷新索引到磁盘
    pub async fn flush(&self) -> Result<(), CacheError> {
        let state = self.state.lock().await;
        self.save_index(&state).await
    }
}

#[async_trait]
impl AudioCachePort for FileAudioCache {
    async fn get(&self, request: &SpeechRequest) -> Option<Vec<u8>> {
        let cache_key = generate_cache_key(request);
        self.request_count.fetch_add(1, Ordering::Relaxed);

        let entry = {
            let mut state = self.state.lock().await;
            let entry = match state.entries.get(&cache_key) {
                Some(entry) => entry.clone(),
                None => {
                    self.record_miss();
                    return None;
                }
            };

            if entry.is_expired(self.clock.now()) {
                self.remove_entry(&mut state, &cache_key).await;
                self.save_index_logged(&state).await;
                self.record_miss();
                tracing::debug!(cache_key = %short_key(&cache_key), "Cache entry expired");
                return None;
            }

            entry
        };

        // 文件读取不持锁
        let audio_data = match fs::read(self.blob_path(&cache_key)).await {
            Ok(data) if data.len() as u64 == entry.size_bytes => data,
            Ok(data) => {
                tracing::warn!(
                    cache_key = %short_key(&cache_key),
                    expected = entry.size_bytes,
                    actual = data.len(),
                    "Cache file size mismatch, purging entry"
                );
                self.purge_if_unchanged(&cache_key, entry.seq).await;
                self.record_miss();
                return None;
            }
            Err(e) => {
                tracing::warn!(
                    cache_key = %short_key(&cache_key),
                    error = %e,
                    "Failed to read cache file, purging entry"
                );
                self.purge_if_unchanged(&cache_key, entry.seq).await;
                self.record_miss();
                return None;
            }
        };

        {
            let mut state = self.state.lock().await;
            if let Some(current) = state.entries.get_mut(&cache_key) {
                if current.seq == entry.seq {
                    current.last_accessed = self.clock.now();
                    current.access_count += 1;
                }
            }
        }

        self.hit_count.fetch_add(1, Ordering::Relaxed);
        tracing::info!(cache_key = %short_key(&cache_key), "Cache hit");
        Some(audio_data)
    }

    async fn put(
        &self,
        request: &SpeechRequest,
        audio_data: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let size = audio_data.len() as u64;
        if size > self.max_size_bytes {
            return Err(CacheError::CapacityExceeded {
                size,
                max: self.max_size_bytes,
            });
        }

        let cache_key = generate_cache_key(request);
        let ttl = ttl.unwrap_or(self.default_ttl);

        let mut state = self.state.lock().await;

        // 覆盖写入：先移除旧条目
        let replaced = self.remove_entry(&mut state, &cache_key).await.is_some();
        let evicted = self.evict_for(&mut state, size).await;

        if let Err(e) = self.write_blob(&cache_key, &audio_data).await {
            tracing::error!(
                cache_key = %short_key(&cache_key),
                error = %e,
                "Failed to write cache file"
            );
            if replaced || evicted > 0 {
                self.save_index_logged(&state).await;
            }
            return Err(e);
        }

        let now = self.clock.now();
        let seq = state.take_seq();
        state.entries.insert(
            cache_key.clone(),
            CacheEntry {
                fingerprint: cache_key.clone(),
                created_at: now,
                last_accessed: now,
                access_count: 0,
                size_bytes: size,
                ttl_secs: ttl.num_seconds(),
                seq,
                source_params_digest: Some(request.digest()),
            },
        );
        state.total_size += size;

        if let Err(e) = self.save_index(&state).await {
            // 索引未落盘：回滚本次写入
            tracing::error!(
                cache_key = %short_key(&cache_key),
                error = %e,
                "Failed to save cache metadata, rolling back write"
            );
            self.remove_entry(&mut state, &cache_key).await;
            return Err(e);
        }

        tracing::info!(
            cache_key = %short_key(&cache_key),
            size_bytes = size,
            evicted = evicted,
            "Audio cached"
        );

        Ok(())
    }

    async fn clear_expired(&self) -> usize {
        let mut state = self.state.lock().await;
        let now = self.clock.now();

        let expired: Vec<String> = state
            .entries
            .values()
            .filter(|e| e.is_expired(now))
            .map(|e| e.fingerprint.clone())
            .collect();

        for key in &expired {
            self.remove_entry(&mut state, key).await;
        }

        if !expired.is_empty() {
            self.save_index_logged(&state).await;
            tracing::info!(removed = expired.len(), "Removed expired cache items");
        }

        expired.len()
    }

    async fn clear_all(&self) -> usize {
        let mut state = self.state.lock().await;
        let keys: Vec<String> = state.entries.keys().cloned().collect();

        for key in &keys {
            self.remove_entry(&mut state, key).await;
        }
        state.total_size = 0;

        self.save_index_logged(&state).await;
        tracing::info!(removed = keys.len(), "Cleared all cache items");

        keys.len()
    }

    async fn stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        let hits = self.hit_count.load(Ordering::Relaxed);
        let total_requests = self.request_count.load(Ordering::Relaxed);

        CacheStats {
            hits,
            misses: self.miss_count.load(Ordering::Relaxed),
            total_requests,
            cache_size_bytes: state.total_size,
            files_count: state.entries.len(),
            hit_rate: CacheStats::compute_hit_rate(hits, total_requests),
            cache_size_mb: bytes_to_mb(state.total_size),
            max_cache_size_mb: bytes_to_mb(self.max_size_bytes),
        }
    }

    async fn entries(&self) -> Vec<CacheEntryInfo> {
        let state = self.state.lock().await;
        let now = self.clock.now();

        let mut items: Vec<CacheEntryInfo> = state
            .entries
            .values()
            .map(|e| CacheEntryInfo::from_entry(e, now))
            .collect();
        items.sort_by(|a, b| b.last_accessed.cmp(&a.last_accessed));
        items
    }
}

/// 扫描到的缓存文件
#[derive(Debug, Clone, Copy)]
struct BlobInfo {
    size: u64,
    modified: Option<DateTime<Utc>>,
}

/// 读取索引文件，不存在或无法解析时返回 None
async fn load_index(path: &Path) -> Option<IndexFile> {
    let content = match fs::read(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read cache metadata");
            return None;
        }
    };

    match serde_json::from_slice::<IndexFile>(&content) {
        Ok(index) => {
            tracing::info!(entries = index.entries.len(), "Loaded cache metadata");
            Some(index)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to parse cache metadata, rescanning cache files");
            None
        }
    }
}

/// 扫描缓存目录中的音频文件，顺带清理上次中断留下的临时文件
async fn scan_blobs(dir: &Path) -> Result<HashMap<String, BlobInfo>, CacheError> {
    let mut blobs = HashMap::new();
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| CacheError::IoError(e.to_string()))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| CacheError::IoError(e.to_string()))?
    {
        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str());

        if ext == Some(PARTIAL_EXT) {
            let _ = fs::remove_file(&path).await;
            continue;
        }
        if ext != Some(BLOB_EXT) {
            continue;
        }

        let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let Ok(metadata) = entry.metadata().await else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }

        blobs.insert(
            key.to_string(),
            BlobInfo {
                size: metadata.len(),
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            },
        );
    }

    Ok(blobs)
}

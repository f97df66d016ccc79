//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_cache;
mod clock;
mod kv_store;
mod session_manager;
mod text_segmenter;
mod tts_engine;

pub use audio_cache::{
    bytes_to_mb, generate_cache_key, short_key, AudioCachePort, CacheEntry, CacheEntryInfo,
    CacheError, CacheStats,
};
pub use clock::{system_clock, Clock, ManualClock, SharedClock, SystemClock};
pub use kv_store::{KeyValueStorePort, StoreError};
pub use session_manager::{SessionError, SessionManagerPort, SessionStats, TierRequest};
pub use text_segmenter::{SegmentError, SegmentMode, TextSegmenterPort};
pub use tts_engine::{AudioStream, TtsEnginePort, TtsError};

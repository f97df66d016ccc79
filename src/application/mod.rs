//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（AudioCache、SessionManager、TtsEngine、TextSegmenter 等）
//! - services: 缓存优先的语音生成、音色目录
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;
pub mod services;

// Re-exports
pub use commands::{
    // Speech commands
    ClearCacheCommand,
    ClearCacheResponse,
    ClearExpiredCacheCommand,
    GenerateSpeechCommand,
    PreloadCacheCommand,
    PreloadCacheResponse,
    // Session commands
    CreateSessionCommand,
    DeleteSessionCommand,
    DeleteSessionResponse,
    SegmentSessionCommand,
    // Handlers
    handlers::{
        ClearCacheHandler, ClearExpiredCacheHandler, CreateSessionHandler, DeleteSessionHandler,
        GenerateSpeechHandler, PreloadCacheHandler, SegmentSessionHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Audio cache
    generate_cache_key,
    AudioCachePort,
    CacheEntryInfo,
    CacheError,
    CacheStats,
    // Session manager
    SessionError,
    SessionManagerPort,
    SessionStats,
    TierRequest,
    // Text segmenter
    SegmentMode,
    TextSegmenterPort,
    // TTS engine
    AudioStream,
    TtsEnginePort,
    TtsError,
};

pub use queries::{
    GetCacheStats,
    GetSession,
    GetSessionStats,
    ListCacheEntries,
    ListVoices,
    RefreshVoices,
    SegmentText,
    // Handlers
    handlers::{
        GetCacheStatsHandler, GetSessionHandler, GetSessionStatsHandler, ListCacheEntriesHandler,
        ListVoicesHandler, RefreshVoicesHandler, SegmentTextHandler, SegmentTextResponse,
    },
};

pub use services::{SpeechGenerator, VoiceDirectory};

//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;
use std::time::Duration;

use crate::application::{
    // Command handlers
    ClearCacheHandler, ClearExpiredCacheHandler, CreateSessionHandler, DeleteSessionHandler,
    GenerateSpeechHandler, PreloadCacheHandler, SegmentSessionHandler,
    // Query handlers
    GetCacheStatsHandler, GetSessionHandler, GetSessionStatsHandler, ListCacheEntriesHandler,
    ListVoicesHandler, RefreshVoicesHandler, SegmentTextHandler,
    // Ports
    AudioCachePort, SessionManagerPort, TextSegmenterPort, TtsEnginePort,
    // Services
    SpeechGenerator, VoiceDirectory,
};

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub audio_cache: Arc<dyn AudioCachePort>,
    pub session_manager: Arc<dyn SessionManagerPort>,
    pub tts_engine: Arc<dyn TtsEnginePort>,
    pub segmenter: Arc<dyn TextSegmenterPort>,

    // ========== Command Handlers ==========
    pub generate_speech_handler: GenerateSpeechHandler,
    pub preload_cache_handler: PreloadCacheHandler,
    pub clear_cache_handler: ClearCacheHandler,
    pub clear_expired_cache_handler: ClearExpiredCacheHandler,
    pub create_session_handler: CreateSessionHandler,
    pub segment_session_handler: SegmentSessionHandler,
    pub delete_session_handler: DeleteSessionHandler,

    // ========== Query Handlers ==========
    pub list_voices_handler: ListVoicesHandler,
    pub refresh_voices_handler: RefreshVoicesHandler,
    pub segment_text_handler: SegmentTextHandler,
    pub cache_stats_handler: GetCacheStatsHandler,
    pub cache_entries_handler: ListCacheEntriesHandler,
    pub get_session_handler: GetSessionHandler,
    pub session_stats_handler: GetSessionStatsHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        tts_engine: Arc<dyn TtsEnginePort>,
        audio_cache: Arc<dyn AudioCachePort>,
        session_manager: Arc<dyn SessionManagerPort>,
        segmenter: Arc<dyn TextSegmenterPort>,
        voice_catalog_ttl: Duration,
    ) -> Self {
        let generator = Arc::new(SpeechGenerator::new(tts_engine.clone(), audio_cache.clone()));
        let voices = Arc::new(VoiceDirectory::new(tts_engine.clone(), voice_catalog_ttl));

        Self {
            // Ports
            audio_cache: audio_cache.clone(),
            session_manager: session_manager.clone(),
            tts_engine: tts_engine.clone(),
            segmenter: segmenter.clone(),

            // Command handlers
            generate_speech_handler: GenerateSpeechHandler::new(generator.clone(), voices.clone()),
            preload_cache_handler: PreloadCacheHandler::new(generator.clone(), voices.clone()),
            clear_cache_handler: ClearCacheHandler::new(audio_cache.clone()),
            clear_expired_cache_handler: ClearExpiredCacheHandler::new(audio_cache.clone()),
            create_session_handler: CreateSessionHandler::new(
                session_manager.clone(),
                voices.clone(),
            ),
            segment_session_handler: SegmentSessionHandler::new(
                session_manager.clone(),
                segmenter.clone(),
            ),
            delete_session_handler: DeleteSessionHandler::new(session_manager.clone()),

            // Query handlers
            list_voices_handler: ListVoicesHandler::new(voices.clone()),
            refresh_voices_handler: RefreshVoicesHandler::new(voices.clone()),
            segment_text_handler: SegmentTextHandler::new(segmenter.clone()),
            cache_stats_handler: GetCacheStatsHandler::new(audio_cache.clone()),
            cache_entries_handler: ListCacheEntriesHandler::new(audio_cache.clone()),
            get_session_handler: GetSessionHandler::new(session_manager.clone()),
            session_stats_handler: GetSessionStatsHandler::new(session_manager.clone()),
        }
    }
}

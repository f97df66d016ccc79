//! Voice Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::queries::{ListVoices, RefreshVoices};
use crate::application::services::VoiceDirectory;
use crate::domain::Voice;

/// ListVoices Handler
pub struct ListVoicesHandler {
    voices: Arc<VoiceDirectory>,
}

impl ListVoicesHandler {
    pub fn new(voices: Arc<VoiceDirectory>) -> Self {
        Self { voices }
    }

    pub async fn handle(&self, _query: ListVoices) -> Result<Arc<Vec<Voice>>, ApplicationError> {
        self.voices.voices().await
    }
}

/// RefreshVoices Handler - 绕过目录缓存
pub struct RefreshVoicesHandler {
    voices: Arc<VoiceDirectory>,
}

impl RefreshVoicesHandler {
    pub fn new(voices: Arc<VoiceDirectory>) -> Self {
        Self { voices }
    }

    pub async fn handle(&self, _query: RefreshVoices) -> Result<Arc<Vec<Voice>>, ApplicationError> {
        self.voices.refresh().await
    }
}

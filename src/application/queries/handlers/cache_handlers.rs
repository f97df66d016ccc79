//! Cache Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{AudioCachePort, CacheEntryInfo, CacheStats};
use crate::application::queries::{GetCacheStats, ListCacheEntries};

/// GetCacheStats Handler
pub struct GetCacheStatsHandler {
    cache: Arc<dyn AudioCachePort>,
}

impl GetCacheStatsHandler {
    pub fn new(cache: Arc<dyn AudioCachePort>) -> Self {
        Self { cache }
    }

    pub async fn handle(&self, _query: GetCacheStats) -> Result<CacheStats, ApplicationError> {
        Ok(self.cache.stats().await)
    }
}

/// ListCacheEntries Handler
pub struct ListCacheEntriesHandler {
    cache: Arc<dyn AudioCachePort>,
}

impl ListCacheEntriesHandler {
    pub fn new(cache: Arc<dyn AudioCachePort>) -> Self {
        Self { cache }
    }

    pub async fn handle(
        &self,
        _query: ListCacheEntries,
    ) -> Result<Vec<CacheEntryInfo>, ApplicationError> {
        Ok(self.cache.entries().await)
    }
}

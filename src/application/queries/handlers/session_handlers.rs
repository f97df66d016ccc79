//! Session Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{SessionManagerPort, SessionStats};
use crate::application::queries::{GetSession, GetSessionStats};
use crate::domain::SessionRecord;

/// GetSession Handler
pub struct GetSessionHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl GetSessionHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(&self, query: GetSession) -> Result<SessionRecord, ApplicationError> {
        self.session_manager
            .get(&query.session_id)
            .await
            .ok_or_else(|| ApplicationError::not_found("Session", query.session_id))
    }
}

/// GetSessionStats Handler
pub struct GetSessionStatsHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl GetSessionStatsHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(&self, _query: GetSessionStats) -> Result<SessionStats, ApplicationError> {
        Ok(self.session_manager.stats().await)
    }
}

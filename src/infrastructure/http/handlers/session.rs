//! Session Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::application::{
    CreateSessionCommand, DeleteSessionCommand, GetSession, GetSessionStats,
    SegmentSessionCommand, SessionStats,
};
use crate::infrastructure::http::dto::{
    ApiResponse, CreateSessionRequest, DeleteSessionResponse, SessionResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Create
// ============================================================================

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>, ApiError> {
    let cmd = CreateSessionCommand {
        text: req.text,
        voice: req.voice,
        name: req.name,
        ttl_hours: req.ttl_hours,
        metadata: req.metadata,
        persistent: req.persistent,
    };

    let record = state.create_session_handler.handle(cmd).await?;
    Ok(Json(ApiResponse::success(SessionResponse::from(record))))
}

// ============================================================================
// Get / Stats
// ============================================================================

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<SessionResponse>>, ApiError> {
    let record = state
        .get_session_handler
        .handle(GetSession { session_id })
        .await?;
    Ok(Json(ApiResponse::success(SessionResponse::from(record))))
}

pub async fn session_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SessionStats>>, ApiError> {
    let stats = state.session_stats_handler.handle(GetSessionStats).await?;
    Ok(Json(ApiResponse::success(stats)))
}

// ============================================================================
// Segment
// ============================================================================

pub async fn segment_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<SessionResponse>>, ApiError> {
    let record = state
        .segment_session_handler
        .handle(SegmentSessionCommand { session_id })
        .await?;
    Ok(Json(ApiResponse::success(SessionResponse::from(record))))
}

// ============================================================================
// Delete
// ============================================================================

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<DeleteSessionResponse>>, ApiError> {
    let result = state
        .delete_session_handler
        .handle(DeleteSessionCommand { session_id })
        .await?;
    Ok(Json(ApiResponse::success(DeleteSessionResponse {
        session_id: result.session_id,
        deleted: true,
    })))
}

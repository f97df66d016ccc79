//! Voice Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{ListVoices, RefreshVoices};
use crate::domain::Voice;
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 音色目录（缓存）
pub async fn list_voices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Voice>>>, ApiError> {
    let voices = state.list_voices_handler.handle(ListVoices).await?;
    Ok(Json(ApiResponse::success(voices.as_ref().clone())))
}

/// 音色目录（强制刷新）
pub async fn refresh_voices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Voice>>>, ApiError> {
    let voices = state.refresh_voices_handler.handle(RefreshVoices).await?;
    Ok(Json(ApiResponse::success(voices.as_ref().clone())))
}

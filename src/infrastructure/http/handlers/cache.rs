//! Cache Handlers - 缓存统计与维护

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{
    CacheEntryInfo, CacheStats, ClearCacheCommand, ClearExpiredCacheCommand, GetCacheStats,
    ListCacheEntries, PreloadCacheCommand,
};
use crate::infrastructure::http::dto::{
    ApiResponse, ClearResponse, PreloadRequest, PreloadResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

pub async fn cache_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<CacheStats>>, ApiError> {
    let stats = state.cache_stats_handler.handle(GetCacheStats).await?;
    Ok(Json(ApiResponse::success(stats)))
}

pub async fn cache_info(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<CacheEntryInfo>>>, ApiError> {
    let entries = state.cache_entries_handler.handle(ListCacheEntries).await?;
    Ok(Json(ApiResponse::success(entries)))
}

pub async fn preload_cache(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PreloadRequest>,
) -> Result<Json<ApiResponse<PreloadResponse>>, ApiError> {
    let cmd = PreloadCacheCommand {
        request: req.speech,
        ttl_hours: req.ttl_hours,
    };

    let result = state.preload_cache_handler.handle(cmd).await?;
    Ok(Json(ApiResponse::success(PreloadResponse::from(result))))
}

pub async fn clear_cache(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ClearResponse>>, ApiError> {
    let result = state.clear_cache_handler.handle(ClearCacheCommand).await?;
    Ok(Json(ApiResponse::success(ClearResponse {
        removed: result.removed,
    })))
}

pub async fn clear_expired_cache(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ClearResponse>>, ApiError> {
    let result = state
        .clear_expired_cache_handler
        .handle(ClearExpiredCacheCommand)
        .await?;
    Ok(Json(ApiResponse::success(ClearResponse {
        removed: result.removed,
    })))
}

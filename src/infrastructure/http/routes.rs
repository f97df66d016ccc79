//! HTTP Routes
//!
//! API Endpoints:
//! - /                               GET     服务信息
//! - /api/ping                       GET     健康检查
//! - /api/v1/voices                  GET     音色目录（缓存）
//! - /api/v1/voices/refresh          GET     音色目录（强制刷新）
//! - /api/v1/generate                POST    生成语音（audio/mpeg 流）
//! - /api/v1/segment                 POST    分词
//! - /api/v1/cache/stats             GET     缓存统计
//! - /api/v1/cache/info              GET     缓存条目列表
//! - /api/v1/cache/preload           POST    预加载缓存
//! - /api/v1/cache/clear             POST    清空缓存
//! - /api/v1/cache/clear-expired     POST    清理过期缓存
//! - /api/v1/session/create          POST    创建会话
//! - /api/v1/session/stats           GET     会话统计
//! - /api/v1/session/{id}            GET     获取会话
//! - /api/v1/session/{id}            DELETE  删除会话
//! - /api/v1/session/{id}/segment    POST    会话分句

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::root))
        .nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/v1", v1_routes())
}

/// V1 路由
fn v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/voices", get(handlers::list_voices))
        .route("/voices/refresh", get(handlers::refresh_voices))
        .route("/generate", post(handlers::generate))
        .route("/segment", post(handlers::segment_text))
        .nest("/cache", cache_routes())
        .nest("/session", session_routes())
}

/// Cache 路由
fn cache_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stats", get(handlers::cache_stats))
        .route("/info", get(handlers::cache_info))
        .route("/preload", post(handlers::preload_cache))
        .route("/clear", post(handlers::clear_cache))
        .route("/clear-expired", post(handlers::clear_expired_cache))
}

/// Session 路由
fn session_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(handlers::create_session))
        .route("/stats", get(handlers::session_stats))
        .route(
            "/:session_id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/:session_id/segment", post(handlers::segment_session))
}

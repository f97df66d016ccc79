//! Ping Handlers
//!
//! 服务信息与健康检查

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::infrastructure::http::dto::{ApiResponse, ServiceInfo};
use crate::infrastructure::http::state::AppState;

/// Ping 响应
#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Ping endpoint - 健康检查
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// 根路径 - 服务信息
pub async fn root(State(state): State<Arc<AppState>>) -> Json<ApiResponse<ServiceInfo>> {
    let tts_available = state.tts_engine.health_check().await;
    Json(ApiResponse::success(ServiceInfo {
        service: env!("CARGO_PKG_NAME"),
        status: "running",
        version: env!("CARGO_PKG_VERSION"),
        tts_available,
    }))
}

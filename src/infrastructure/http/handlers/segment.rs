//! Segment Handlers - 分词

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::SegmentText;
use crate::infrastructure::http::dto::{ApiResponse, SegmentRequest, SegmentResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

pub async fn segment_text(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SegmentRequest>,
) -> Result<Json<ApiResponse<SegmentResponse>>, ApiError> {
    let query = SegmentText {
        text: req.text,
        mode: req.mode,
    };

    let result = state.segment_text_handler.handle(query).await?;
    Ok(Json(ApiResponse::success(SegmentResponse::from(result))))
}

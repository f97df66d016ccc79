//! Speech Handlers - 语音生成

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::application::GenerateSpeechCommand;
use crate::infrastructure::http::dto::GenerateRequest;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 生成语音，以 audio/mpeg 分块流返回
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> Result<Response, ApiError> {
    let cmd = GenerateSpeechCommand {
        request: req.speech,
        use_cache: req.use_cache,
    };

    let stream = state.generate_speech_handler.handle(cmd).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "audio/mpeg"),
            (header::CONTENT_DISPOSITION, "attachment; filename=speech.mp3"),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

//! Alignment HTTP Handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;

use crate::application::AlignAudioCommand;
use crate::infrastructure::http::dto::{AlignRequest, AlignResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 对齐调用方上传的音频（base64）
pub async fn align_audio(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AlignRequest>, JsonRejection>,
) -> Result<Json<AlignResponse>, ApiError> {
    let Json(req) = payload?;

    let audio = STANDARD.decode(req.audio_file.trim()).map_err(|e| {
        ApiError::bad_request("invalid_base64", format!("Invalid base64 encoding: {}", e))
    })?;

    let result = state
        .align_handler
        .handle(AlignAudioCommand {
            audio,
            language: req.language,
            text: req.text,
        })
        .await?;

    Ok(Json(AlignResponse {
        words: result.words,
    }))
}

//! Speech HTTP Handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::application::{SpeechWithAlignmentCommand, SynthesizeSpeechCommand};
use crate::infrastructure::http::dto::{
    SpeechRequest, SpeechWithAlignmentBody, SpeechWithAlignmentRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 合成语音，返回二进制音频
pub async fn create_speech(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SpeechRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;

    let result = state
        .synthesize_handler
        .handle(SynthesizeSpeechCommand {
            params: req.into_params(),
        })
        .await?;

    let headers = [
        (header::CONTENT_TYPE, result.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=speech.{}", result.format),
        ),
    ];
    Ok((headers, result.audio).into_response())
}

/// 合成语音并返回单词时间戳
pub async fn create_speech_with_alignment(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SpeechWithAlignmentRequest>, JsonRejection>,
) -> Result<Json<SpeechWithAlignmentBody>, ApiError> {
    let Json(req) = payload?;

    let result = state
        .speech_with_alignment_handler
        .handle(SpeechWithAlignmentCommand {
            params: req.speech.into_params(),
            language: req.language,
        })
        .await?;

    Ok(Json(result.into()))
}

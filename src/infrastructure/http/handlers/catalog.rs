//! Catalog HTTP Handlers - 音色列表与合成后端透传

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::application::{ListModels, ListVoices, PassthroughResponse, ProxyWeb};
use crate::infrastructure::http::dto::VoicesResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 后端响应原样转发；非法状态码按 502 处理
fn passthrough(resp: PassthroughResponse) -> Response {
    let status = StatusCode::from_u16(resp.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = resp
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());
    (status, [(header::CONTENT_TYPE, content_type)], resp.body).into_response()
}

pub async fn list_voices(State(state): State<Arc<AppState>>) -> Json<VoicesResponse> {
    Json(state.list_voices_handler.handle(ListVoices).into())
}

pub async fn list_models(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let resp = state.list_models_handler.handle(ListModels).await?;
    Ok(passthrough(resp))
}

/// `/web` 与 `/web/`
pub async fn proxy_web_root(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let resp = state
        .proxy_web_handler
        .handle(ProxyWeb {
            path: String::new(),
        })
        .await?;
    Ok(passthrough(resp))
}

pub async fn proxy_web(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let resp = state.proxy_web_handler.handle(ProxyWeb { path }).await?;
    Ok(passthrough(resp))
}

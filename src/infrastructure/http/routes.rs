//! HTTP Routes
//!
//! API Endpoints:
//! - /                                  GET   服务信息
//! - /health                            GET   健康检查
//! - /v1/models                         GET   模型列表（透传合成后端）
//! - /v1/audio/voices                   GET   音色列表
//! - /v1/audio/speech                   POST  合成语音（二进制音频）
//! - /v1/audio/align                    POST  对齐上传的音频
//! - /v1/audio/speech_with_alignment    POST  合成并返回单词时间戳
//! - /web/*                             GET   透传合成后端 Web 界面

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
        .route("/", get(handlers::service_info))
        .route("/health", get(handlers::health))
        .route("/v1/models", get(handlers::list_models))
        .nest("/v1/audio", audio_routes())
        .route("/web", get(handlers::proxy_web_root))
        .route("/web/", get(handlers::proxy_web_root))
        .route("/web/*path", get(handlers::proxy_web))
}

/// Audio 路由
fn audio_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/voices", get(handlers::list_voices))
        .route("/speech", post(handlers::create_speech))
        .route("/align", post(handlers::align_audio))
        .route(
            "/speech_with_alignment",
            post(handlers::create_speech_with_alignment),
        )
}

//! Status Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{GetHealth, GetServiceInfo};
use crate::infrastructure::http::dto::{HealthBody, ServiceInfoBody};
use crate::infrastructure::http::state::AppState;

/// 服务信息
pub async fn service_info(State(state): State<Arc<AppState>>) -> Json<ServiceInfoBody> {
    Json(state.service_info_handler.handle(GetServiceInfo).into())
}

/// 健康检查：合成后端可达性与流水线占用
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthBody> {
    Json(state.health_handler.handle(GetHealth).await.into())
}

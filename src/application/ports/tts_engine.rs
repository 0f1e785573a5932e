//! TTS Engine Port - 语音合成后端抽象
//!
//! 定义 TTS 合成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::speech::{AudioFormat, SynthesisRequest};

/// TTS 错误
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error (HTTP {status}): {message}")]
    ServiceError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// TTS 合成结果
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    /// 编码后的音频数据
    pub audio_data: Vec<u8>,
    /// 实际音频格式（可能与请求格式不同）
    pub format: AudioFormat,
    /// 后端声明的 Content-Type
    pub content_type: Option<String>,
    /// 采样率
    pub sample_rate: Option<u32>,
    /// 声道数
    pub channels: Option<u16>,
}

/// 后端透传响应（模型列表、Web UI 等）
#[derive(Debug, Clone)]
pub struct PassthroughResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// TTS Engine Port
///
/// 外部 TTS 服务的抽象接口；实现方不做重试
#[async_trait]
pub trait TtsEnginePort: Send + Sync {
    /// 执行语音合成
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisResult, TtsError>;

    /// GET 透传到后端（`path` 以 `/` 开头）
    async fn passthrough_get(&self, path: &str) -> Result<PassthroughResponse, TtsError>;

    /// 后端地址（用于服务信息展示）
    fn backend_url(&self) -> &str;

    /// 检查 TTS 服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}

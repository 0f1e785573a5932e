//! Alignment Engine Port - 语音对齐后端抽象
//!
//! 后端接收解码后的单声道样本和参考文本，返回带时间戳的 token 流

use async_trait::async_trait;
use thiserror::Error;

use super::audio_codec::DecodedAudio;
use crate::domain::alignment::RawAlignmentToken;

/// 对齐错误
#[derive(Debug, Error)]
pub enum AlignmentError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error (HTTP {status}): {message}")]
    ServiceError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 对齐提示信息
#[derive(Debug, Clone, Default)]
pub struct AlignmentHints {
    /// 参考文本（强制对齐）；为 None 时后端自由转写
    pub reference_text: Option<String>,
    /// 语言代码，如 `en`；为 None 时由后端自动检测
    pub language: Option<String>,
}

/// Alignment Engine Port
#[async_trait]
pub trait AlignmentEnginePort: Send + Sync {
    /// 对齐音频，返回后端原始 token（不做任何修正）
    async fn align(
        &self,
        audio: &DecodedAudio,
        hints: &AlignmentHints,
    ) -> Result<Vec<RawAlignmentToken>, AlignmentError>;

    /// 模型描述（用于服务信息展示）
    fn model_name(&self) -> &str;

    /// 运行设备，如 `cpu`
    fn device(&self) -> &str;
}

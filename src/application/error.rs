//! 应用层错误定义
//!
//! 网关统一错误类型，HTTP 层据此映射状态码

use std::time::Duration;
use thiserror::Error;

use crate::application::ports::{AlignmentError, CodecError, TtsError};
use crate::domain::speech::SpeechError;

/// 出错的流水线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Synthesis,
    Alignment,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Synthesis => "synthesis",
            Stage::Alignment => "alignment",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 网关错误
#[derive(Debug, Error)]
pub enum GatewayError {
    /// 未知音色
    #[error("Voice not found: {0}")]
    InvalidVoice(String),

    /// 参数校验失败
    #[error("{0}")]
    InvalidParameter(String),

    /// 后端不可达或超时
    #[error("{stage} backend unavailable: {message}")]
    BackendUnavailable { stage: Stage, message: String },

    /// 后端返回错误
    #[error("{stage} backend error: {message}")]
    BackendError {
        stage: Stage,
        status: Option<u16>,
        message: String,
    },

    /// 音频损坏或无法识别
    #[error("Failed to decode audio: {0}")]
    DecodeError(String),

    /// 无法编码为请求的格式
    #[error("Failed to encode audio: {0}")]
    EncodeError(String),

    /// 对齐超出时间预算
    #[error("Alignment timed out after {}s", .0.as_secs_f64())]
    AlignmentTimeout(Duration),

    /// 对齐后端未返回有效结果
    #[error("Alignment failed: {0}")]
    AlignmentFailure(String),

    /// 排队超时
    #[error("Service busy: no pipeline slot became available within {}s", .0.as_secs_f64())]
    ServiceBusy(Duration),

    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// 创建参数错误
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// 调用方退避后重试是否可能成功
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::BackendUnavailable { .. }
                | Self::BackendError { .. }
                | Self::AlignmentTimeout(_)
                | Self::AlignmentFailure(_)
                | Self::ServiceBusy(_)
        )
    }

    /// 合成后端错误
    pub fn from_tts(err: TtsError) -> Self {
        let stage = Stage::Synthesis;
        match err {
            TtsError::NetworkError(message) => Self::BackendUnavailable { stage, message },
            TtsError::Timeout => Self::BackendUnavailable {
                stage,
                message: "request timed out".to_string(),
            },
            TtsError::ServiceError { status, message } => Self::BackendError {
                stage,
                status: Some(status),
                message,
            },
            TtsError::InvalidResponse(message) => Self::BackendError {
                stage,
                status: None,
                message,
            },
        }
    }

    /// 对齐后端错误
    pub fn from_alignment(err: AlignmentError, budget: Duration) -> Self {
        let stage = Stage::Alignment;
        match err {
            AlignmentError::NetworkError(message) => Self::BackendUnavailable { stage, message },
            AlignmentError::Timeout => Self::AlignmentTimeout(budget),
            AlignmentError::ServiceError { status, message } => Self::BackendError {
                stage,
                status: Some(status),
                message,
            },
            AlignmentError::InvalidResponse(message) => Self::AlignmentFailure(message),
        }
    }

    /// 编解码错误
    pub fn from_codec(err: CodecError) -> Self {
        if err.is_encoding() {
            Self::EncodeError(err.to_string())
        } else {
            Self::DecodeError(err.to_string())
        }
    }
}

impl From<SpeechError> for GatewayError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::InvalidVoice(voice) => Self::InvalidVoice(voice),
            SpeechError::InvalidParameter(message) => Self::InvalidParameter(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tts_error_mapping() {
        let err = GatewayError::from_tts(TtsError::Timeout);
        assert!(matches!(
            err,
            GatewayError::BackendUnavailable {
                stage: Stage::Synthesis,
                ..
            }
        ));

        let err = GatewayError::from_tts(TtsError::ServiceError {
            status: 500,
            message: "boom".into(),
        });
        assert!(matches!(
            err,
            GatewayError::BackendError {
                status: Some(500),
                ..
            }
        ));
        assert!(err.to_string().starts_with("synthesis backend error"));
    }

    #[test]
    fn test_alignment_error_mapping() {
        let budget = Duration::from_secs(30);
        assert!(matches!(
            GatewayError::from_alignment(AlignmentError::Timeout, budget),
            GatewayError::AlignmentTimeout(d) if d == budget
        ));
        assert!(matches!(
            GatewayError::from_alignment(AlignmentError::InvalidResponse("x".into()), budget),
            GatewayError::AlignmentFailure(_)
        ));
        assert!(matches!(
            GatewayError::from_alignment(AlignmentError::NetworkError("x".into()), budget),
            GatewayError::BackendUnavailable {
                stage: Stage::Alignment,
                ..
            }
        ));
    }

    #[test]
    fn test_codec_error_mapping() {
        assert!(matches!(
            GatewayError::from_codec(CodecError::DecodingError("bad".into())),
            GatewayError::DecodeError(_)
        ));
        assert!(matches!(
            GatewayError::from_codec(CodecError::UnsupportedFormat("mp3".into())),
            GatewayError::EncodeError(_)
        ));
    }

    #[test]
    fn test_retryable() {
        assert!(GatewayError::ServiceBusy(Duration::from_secs(1)).is_retryable());
        assert!(!GatewayError::invalid_parameter("x").is_retryable());
        assert!(!GatewayError::DecodeError("x".into()).is_retryable());
    }

    #[test]
    fn test_speech_error_conversion() {
        let err: GatewayError = SpeechError::InvalidVoice("zz".into()).into();
        assert!(matches!(err, GatewayError::InvalidVoice(v) if v == "zz"));
    }
}

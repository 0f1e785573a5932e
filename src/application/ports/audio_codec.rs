//! Audio Codec Port - 音频编解码抽象
//!
//! 解码：任意支持的容器 -> 单声道 f32 样本（对齐后端需要固定 16kHz）
//! 编码：单声道 f32 样本 -> 调用方请求的容器

use thiserror::Error;

use crate::domain::speech::AudioFormat;

/// 对齐后端要求的采样率
pub const ALIGNMENT_SAMPLE_RATE: u32 = 16_000;

/// 编解码错误
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

impl CodecError {
    /// 是否为编码侧错误
    pub fn is_encoding(&self) -> bool {
        matches!(self, Self::EncodingError(_) | Self::UnsupportedFormat(_))
    }
}

/// 解码后的音频（单声道）
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// 归一化样本 [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// 采样率
    pub sample_rate: u32,
    /// 时长（秒）
    pub duration_secs: f64,
}

impl DecodedAudio {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        let duration_secs = if sample_rate > 0 {
            samples.len() as f64 / sample_rate as f64
        } else {
            0.0
        };
        Self {
            samples,
            sample_rate,
            duration_secs,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Audio Codec Port
///
/// CPU 密集型同步接口，调用方负责放到阻塞线程池执行
pub trait AudioCodecPort: Send + Sync {
    /// 解码为单声道样本；`target_rate` 为 None 时保持原始采样率
    ///
    /// 损坏或截断的输入必须返回错误，不返回部分样本
    fn decode_to(
        &self,
        data: &[u8],
        format: AudioFormat,
        target_rate: Option<u32>,
    ) -> Result<DecodedAudio, CodecError>;

    /// 编码为指定容器
    fn encode(&self, audio: &DecodedAudio, format: AudioFormat) -> Result<Vec<u8>, CodecError>;

    /// 是否支持编码为指定格式
    fn supports_encoding(&self, format: AudioFormat) -> bool;

    /// 解码为对齐后端需要的 16kHz 单声道
    fn decode(&self, data: &[u8], format: AudioFormat) -> Result<DecodedAudio, CodecError> {
        self.decode_to(data, format, Some(ALIGNMENT_SAMPLE_RATE))
    }

    /// 格式转换；源格式与目标格式相同时原样返回
    fn transcode(
        &self,
        data: Vec<u8>,
        from: AudioFormat,
        to: AudioFormat,
    ) -> Result<Vec<u8>, CodecError> {
        if from == to {
            return Ok(data);
        }
        if !self.supports_encoding(to) {
            return Err(CodecError::UnsupportedFormat(format!(
                "cannot re-encode {} audio as {}",
                from, to
            )));
        }
        let decoded = self.decode_to(&data, from, None)?;
        self.encode(&decoded, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoded_audio_duration() {
        let audio = DecodedAudio::new(vec![0.0; 8000], 16000);
        assert!((audio.duration_secs - 0.5).abs() < f64::EPSILON);
        assert!(!audio.is_empty());

        let empty = DecodedAudio::new(Vec::new(), 0);
        assert_eq!(empty.duration_secs, 0.0);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_encoding_error_classification() {
        assert!(CodecError::EncodingError("x".into()).is_encoding());
        assert!(CodecError::UnsupportedFormat("x".into()).is_encoding());
        assert!(!CodecError::DecodingError("x".into()).is_encoding());
        assert!(!CodecError::InvalidInput("x".into()).is_encoding());
    }
}

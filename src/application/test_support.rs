//! 应用层测试用桩实现

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{
    AlignmentEnginePort, AlignmentError, AlignmentHints, AudioCodecPort, CodecError,
    DecodedAudio, PassthroughResponse, SynthesisResult, TtsEnginePort, TtsError,
};
use crate::domain::alignment::RawAlignmentToken;
use crate::domain::speech::{AudioFormat, SynthesisRequest};

/// 损坏音频的标记内容，StubCodec 遇到时解码失败
pub const CORRUPT_AUDIO: &[u8] = b"corrupt";

pub struct StubTts {
    pub audio: Vec<u8>,
    pub format: AudioFormat,
    pub failure: Option<fn() -> TtsError>,
    pub calls: AtomicUsize,
}

impl StubTts {
    pub fn returning(audio: &[u8], format: AudioFormat) -> Self {
        Self {
            audio: audio.to_vec(),
            format,
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(failure: fn() -> TtsError) -> Self {
        Self {
            audio: Vec::new(),
            format: AudioFormat::Wav,
            failure: Some(failure),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TtsEnginePort for StubTts {
    async fn synthesize(&self, _request: &SynthesisRequest) -> Result<SynthesisResult, TtsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.failure {
            return Err(failure());
        }
        Ok(SynthesisResult {
            audio_data: self.audio.clone(),
            format: self.format,
            content_type: Some(self.format.content_type().to_string()),
            sample_rate: None,
            channels: None,
        })
    }

    async fn passthrough_get(&self, path: &str) -> Result<PassthroughResponse, TtsError> {
        if let Some(failure) = self.failure {
            return Err(failure());
        }
        Ok(PassthroughResponse {
            status: 200,
            content_type: Some("application/json".to_string()),
            body: format!("{{\"path\":\"{}\"}}", path).into_bytes(),
        })
    }

    fn backend_url(&self) -> &str {
        "http://stub-tts"
    }
}

pub struct StubAligner {
    pub tokens: Vec<RawAlignmentToken>,
    pub failure: Option<fn() -> AlignmentError>,
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl StubAligner {
    pub fn returning(tokens: Vec<RawAlignmentToken>) -> Self {
        Self {
            tokens,
            failure: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(failure: fn() -> AlignmentError) -> Self {
        Self {
            tokens: Vec::new(),
            failure: Some(failure),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AlignmentEnginePort for StubAligner {
    async fn align(
        &self,
        _audio: &DecodedAudio,
        _hints: &AlignmentHints,
    ) -> Result<Vec<RawAlignmentToken>, AlignmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(failure) = self.failure {
            return Err(failure());
        }
        Ok(self.tokens.clone())
    }

    fn model_name(&self) -> &str {
        "stub"
    }

    fn device(&self) -> &str {
        "cpu"
    }
}

/// 每个字节解码为 1ms 静音（16kHz）
pub struct StubCodec;

impl AudioCodecPort for StubCodec {
    fn decode_to(
        &self,
        data: &[u8],
        _format: AudioFormat,
        target_rate: Option<u32>,
    ) -> Result<DecodedAudio, CodecError> {
        if data == CORRUPT_AUDIO {
            return Err(CodecError::DecodingError("corrupt stream".to_string()));
        }
        let rate = target_rate.unwrap_or(16_000);
        let samples = vec![0.0; data.len() * rate as usize / 1000];
        Ok(DecodedAudio::new(samples, rate))
    }

    fn encode(&self, audio: &DecodedAudio, format: AudioFormat) -> Result<Vec<u8>, CodecError> {
        if !self.supports_encoding(format) {
            return Err(CodecError::UnsupportedFormat(format.to_string()));
        }
        Ok(format!("{}:{}", format, audio.samples.len()).into_bytes())
    }

    fn supports_encoding(&self, format: AudioFormat) -> bool {
        matches!(format, AudioFormat::Wav | AudioFormat::Opus)
    }
}

//! Synthesis Client - 合成请求校验与转发
//!
//! 校验在调用后端之前完成，校验失败不会产生任何后端请求

use std::sync::Arc;

use crate::application::error::{GatewayError, Stage};
use crate::application::ports::{SynthesisResult, TtsEnginePort};
use crate::domain::speech::{
    AudioFormat, Speed, SpeechText, SynthesisRequest, VoiceTable, DEFAULT_MODEL,
};

/// 调用方传入的原始合成参数
#[derive(Debug, Clone)]
pub struct SpeechParams {
    pub input: String,
    pub voice: String,
    pub response_format: Option<String>,
    pub speed: Option<f32>,
    pub model: Option<String>,
}

pub struct SynthesisClient {
    engine: Arc<dyn TtsEnginePort>,
    voices: Arc<VoiceTable>,
}

impl SynthesisClient {
    pub fn new(engine: Arc<dyn TtsEnginePort>, voices: Arc<VoiceTable>) -> Self {
        Self { engine, voices }
    }

    pub fn engine(&self) -> &Arc<dyn TtsEnginePort> {
        &self.engine
    }

    pub fn voices(&self) -> &VoiceTable {
        &self.voices
    }

    /// 校验参数并构造合成请求
    pub fn prepare(&self, params: &SpeechParams) -> Result<SynthesisRequest, GatewayError> {
        let text = SpeechText::new(params.input.clone())?;

        let format = match params.response_format.as_deref() {
            Some(raw) if !raw.trim().is_empty() => raw.parse::<AudioFormat>()?,
            _ => AudioFormat::default(),
        };

        let speed = match params.speed {
            Some(value) => Speed::new(value)?,
            None => Speed::default(),
        };

        let voice = self.voices.resolve(&params.voice)?;

        let model = params
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL)
            .to_string();

        Ok(SynthesisRequest {
            text,
            voice,
            format,
            speed,
            model,
        })
    }

    /// 调用合成后端，不做重试
    pub async fn synthesize(
        &self,
        request: &SynthesisRequest,
    ) -> Result<SynthesisResult, GatewayError> {
        tracing::debug!(
            voice = %request.voice,
            format = %request.format,
            speed = request.speed.value(),
            words = request.text.word_count(),
            text = %request.text.preview(50),
            "Forwarding synthesis request"
        );

        let result = self
            .engine
            .synthesize(request)
            .await
            .map_err(GatewayError::from_tts)?;

        if result.audio_data.is_empty() {
            return Err(GatewayError::BackendError {
                stage: Stage::Synthesis,
                status: None,
                message: "backend returned an empty audio payload".to_string(),
            });
        }

        tracing::info!(
            voice = %request.voice,
            requested_format = %request.format,
            backend_format = %result.format,
            audio_bytes = result.audio_data.len(),
            "Synthesis completed"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::TtsError;
    use crate::application::test_support::StubTts;
    use std::collections::HashMap;

    fn client(engine: Arc<StubTts>) -> SynthesisClient {
        let voices = VoiceTable::new(["af_bella", "af_alloy"], &HashMap::new(), "en").unwrap();
        SynthesisClient::new(engine, Arc::new(voices))
    }

    fn params(input: &str, voice: &str) -> SpeechParams {
        SpeechParams {
            input: input.to_string(),
            voice: voice.to_string(),
            response_format: None,
            speed: None,
            model: None,
        }
    }

    #[test]
    fn test_prepare_defaults() {
        let client = client(Arc::new(StubTts::returning(b"RIFF", AudioFormat::Wav)));
        let request = client.prepare(&params("Hello world", "bella")).unwrap();

        assert_eq!(request.voice.as_str(), "af_bella");
        assert_eq!(request.format, AudioFormat::Mp3);
        assert_eq!(request.speed.value(), 1.0);
        assert_eq!(request.model, DEFAULT_MODEL);
        assert_eq!(request.text.as_str(), "Hello world");
    }

    #[test]
    fn test_prepare_rejects_invalid_input() {
        let client = client(Arc::new(StubTts::returning(b"RIFF", AudioFormat::Wav)));

        let err = client.prepare(&params("Hello", "zz_unknown")).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidVoice(_)));

        let mut p = params("Hello", "af_bella");
        p.speed = Some(3.0);
        assert!(matches!(
            client.prepare(&p).unwrap_err(),
            GatewayError::InvalidParameter(_)
        ));

        let mut p = params("Hello", "af_bella");
        p.response_format = Some("aac".to_string());
        assert!(matches!(
            client.prepare(&p).unwrap_err(),
            GatewayError::InvalidParameter(_)
        ));

        assert!(matches!(
            client.prepare(&params("   ", "af_bella")).unwrap_err(),
            GatewayError::InvalidParameter(_)
        ));
    }

    #[tokio::test]
    async fn test_synthesize_maps_backend_errors() {
        let engine = Arc::new(StubTts::failing(|| TtsError::ServiceError {
            status: 500,
            message: "boom".to_string(),
        }));
        let client = client(engine.clone());
        let request = client.prepare(&params("Hello", "af_bella")).unwrap();

        let err = client.synthesize(&request).await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::BackendError {
                stage: Stage::Synthesis,
                status: Some(500),
                ..
            }
        ));
        assert_eq!(engine.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_audio_is_backend_error() {
        let client = client(Arc::new(StubTts::returning(b"", AudioFormat::Wav)));
        let request = client.prepare(&params("Hello", "af_bella")).unwrap();

        let err = client.synthesize(&request).await.unwrap_err();
        assert!(matches!(err, GatewayError::BackendError { status: None, .. }));
    }
}

//! Data Transfer Objects
//!
//! 请求体默认值与 OpenAI `/v1/audio/speech` 保持一致

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::{
    GovernorStats, HealthResponse, ServiceInfoResponse, SpeechParams, SpeechWithAlignmentResponse,
    VoiceResponse,
};
use crate::domain::alignment::WordTiming;

pub const DEFAULT_VOICE: &str = "af_alloy";
pub const DEFAULT_RESPONSE_FORMAT: &str = "mp3";

fn default_model() -> String {
    crate::domain::speech::DEFAULT_MODEL.to_string()
}

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

fn default_response_format() -> String {
    DEFAULT_RESPONSE_FORMAT.to_string()
}

fn default_speed() -> f32 {
    1.0
}

// ============================================================================
// Speech DTOs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechRequest {
    #[serde(default = "default_model")]
    pub model: String,
    pub input: String,
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default = "default_response_format")]
    pub response_format: String,
    #[serde(default = "default_speed")]
    pub speed: f32,
}

impl SpeechRequest {
    pub fn into_params(self) -> SpeechParams {
        SpeechParams {
            input: self.input,
            voice: self.voice,
            response_format: Some(self.response_format),
            speed: Some(self.speed),
            model: Some(self.model),
        }
    }
}

/// 合成并对齐请求：合成参数 + 可选语言
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechWithAlignmentRequest {
    #[serde(flatten)]
    pub speech: SpeechRequest,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SpeechWithAlignmentBody {
    /// base64 编码的音频
    pub audio: String,
    pub words: Vec<WordTiming>,
    pub format: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl From<SpeechWithAlignmentResponse> for SpeechWithAlignmentBody {
    fn from(r: SpeechWithAlignmentResponse) -> Self {
        Self {
            audio: STANDARD.encode(&r.audio),
            words: r.words,
            format: r.format.as_str().to_string(),
            language: r.language,
            warning: r.warning,
        }
    }
}

// ============================================================================
// Alignment DTOs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AlignRequest {
    /// base64 编码的音频文件
    pub audio_file: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AlignResponse {
    pub words: Vec<WordTiming>,
}

// ============================================================================
// Catalog / Status DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct VoiceDto {
    pub id: String,
    pub name: String,
    pub language: String,
}

/// `voices` 为 ID 列表（Kokoro 兼容），`data` 为详细信息
#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    pub voices: Vec<String>,
    pub data: Vec<VoiceDto>,
}

impl From<Vec<VoiceResponse>> for VoicesResponse {
    fn from(list: Vec<VoiceResponse>) -> Self {
        Self {
            voices: list.iter().map(|v| v.id.clone()).collect(),
            data: list
                .into_iter()
                .map(|v| VoiceDto {
                    id: v.id,
                    name: v.name,
                    language: v.language,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ServiceInfoBody {
    pub service: &'static str,
    pub version: &'static str,
    pub tts_backend: String,
    pub alignment_model: String,
    pub alignment_device: String,
    pub started_at: DateTime<Utc>,
}

impl From<ServiceInfoResponse> for ServiceInfoBody {
    fn from(info: ServiceInfoResponse) -> Self {
        Self {
            service: info.service,
            version: info.version,
            tts_backend: info.tts_backend,
            alignment_model: info.alignment_model,
            alignment_device: info.alignment_device,
            started_at: info.started_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PipelineDto {
    pub max_concurrent: usize,
    pub in_flight: usize,
    pub waiting: usize,
}

impl From<GovernorStats> for PipelineDto {
    fn from(stats: GovernorStats) -> Self {
        Self {
            max_concurrent: stats.max_concurrent,
            in_flight: stats.in_flight,
            waiting: stats.waiting,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub tts_backend: &'static str,
    pub pipeline: PipelineDto,
}

impl From<HealthResponse> for HealthBody {
    fn from(health: HealthResponse) -> Self {
        Self {
            status: health.status(),
            tts_backend: if health.tts_healthy {
                "reachable"
            } else {
                "unreachable"
            },
            pipeline: health.pipeline.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::speech::AudioFormat;

    #[test]
    fn test_speech_request_defaults() {
        let req: SpeechRequest = serde_json::from_str(r#"{"input":"Hello"}"#).unwrap();
        assert_eq!(req.model, "tts-1");
        assert_eq!(req.voice, "af_alloy");
        assert_eq!(req.response_format, "mp3");
        assert_eq!(req.speed, 1.0);

        let params = req.into_params();
        assert_eq!(params.response_format.as_deref(), Some("mp3"));
        assert_eq!(params.speed, Some(1.0));
    }

    #[test]
    fn test_combined_request_flattens_speech_fields() {
        let req: SpeechWithAlignmentRequest = serde_json::from_str(
            r#"{"input":"Hello world","voice":"bella","response_format":"wav","language":"en"}"#,
        )
        .unwrap();
        assert_eq!(req.speech.voice, "bella");
        assert_eq!(req.speech.response_format, "wav");
        assert_eq!(req.language.as_deref(), Some("en"));
    }

    #[test]
    fn test_combined_body_omits_missing_warning() {
        let body = SpeechWithAlignmentBody::from(SpeechWithAlignmentResponse {
            audio: b"abc".to_vec(),
            format: AudioFormat::Wav,
            words: vec![WordTiming::new("Hello", 0.0, 0.32)],
            language: "en".into(),
            warning: None,
        });
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["audio"], "YWJj");
        assert_eq!(json["format"], "wav");
        assert_eq!(json["words"][0]["word"], "Hello");
        assert!(json.get("warning").is_none());
    }

    #[test]
    fn test_voices_response_lists_ids() {
        let body = VoicesResponse::from(vec![VoiceResponse {
            id: "af_bella".into(),
            name: "bella".into(),
            language: "af".into(),
        }]);
        assert_eq!(body.voices, vec!["af_bella".to_string()]);
        assert_eq!(body.data[0].name, "bella");
    }
}

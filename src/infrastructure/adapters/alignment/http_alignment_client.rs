//! HTTP Alignment Client - 调用外部语音对齐服务
//!
//! 外部对齐 API:
//! POST {base_url}/v1/align
//! Request: {"audio": base64 16kHz 单声道 PCM16 WAV, "sample_rate", "text",
//!           "language", "model", "device", "vad_filter", "min_silence_duration_ms"}
//! Response: {"tokens": [{"token", "start", "end"}]}

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{
    AlignmentEnginePort, AlignmentError, AlignmentHints, DecodedAudio,
};
use crate::domain::alignment::RawAlignmentToken;
use crate::infrastructure::adapters::codec::encode_wav_pcm16;

#[derive(Debug, Serialize)]
struct AlignHttpRequest<'a> {
    audio: String,
    sample_rate: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
    model: &'a str,
    device: &'a str,
    vad_filter: bool,
    min_silence_duration_ms: u32,
}

#[derive(Debug, Deserialize)]
struct AlignHttpResponse {
    tokens: Vec<RawAlignmentToken>,
}

/// HTTP 对齐客户端配置
#[derive(Debug, Clone)]
pub struct HttpAlignmentClientConfig {
    pub base_url: String,
    /// 传输层超时（秒）；对齐时间预算由应用层单独控制
    pub timeout_secs: u64,
    /// 模型规格，如 `tiny`
    pub model: String,
    /// 运行设备，如 `cpu`
    pub device: String,
    pub vad_filter: bool,
    pub min_silence_duration_ms: u32,
}

impl Default for HttpAlignmentClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9000".to_string(),
            timeout_secs: 60,
            model: "tiny".to_string(),
            device: "cpu".to_string(),
            vad_filter: true,
            min_silence_duration_ms: 200,
        }
    }
}

impl HttpAlignmentClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// HTTP 对齐客户端
pub struct HttpAlignmentClient {
    client: Client,
    config: HttpAlignmentClientConfig,
}

impl HttpAlignmentClient {
    pub fn new(mut config: HttpAlignmentClientConfig) -> Result<Self, AlignmentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AlignmentError::NetworkError(e.to_string()))?;

        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self { client, config })
    }

    fn align_url(&self) -> String {
        format!("{}/v1/align", self.config.base_url)
    }
}

/// 在阻塞线程池上把样本编码为 base64 PCM16 WAV，返回编码结果与 WAV 字节数
async fn encode_audio_payload(audio: &DecodedAudio) -> Result<(String, usize), AlignmentError> {
    let samples = audio.samples.clone();
    let sample_rate = audio.sample_rate;
    tokio::task::spawn_blocking(move || {
        let wav = encode_wav_pcm16(&samples, sample_rate);
        (STANDARD.encode(&wav), wav.len())
    })
    .await
    .map_err(|e| AlignmentError::InvalidResponse(format!("Audio encoding task failed: {}", e)))
}

#[async_trait]
impl AlignmentEnginePort for HttpAlignmentClient {
    async fn align(
        &self,
        audio: &DecodedAudio,
        hints: &AlignmentHints,
    ) -> Result<Vec<RawAlignmentToken>, AlignmentError> {
        let (payload, payload_bytes) = encode_audio_payload(audio).await?;
        let body = AlignHttpRequest {
            audio: payload,
            sample_rate: audio.sample_rate,
            text: hints.reference_text.as_deref(),
            language: hints.language.as_deref(),
            model: &self.config.model,
            device: &self.config.device,
            vad_filter: self.config.vad_filter,
            min_silence_duration_ms: self.config.min_silence_duration_ms,
        };

        tracing::debug!(
            url = %self.align_url(),
            duration_secs = audio.duration_secs,
            payload_bytes,
            "Sending alignment request"
        );

        let response = self
            .client
            .post(self.align_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AlignmentError::Timeout
                } else if e.is_connect() {
                    AlignmentError::NetworkError(format!(
                        "Cannot connect to alignment service: {}",
                        e
                    ))
                } else {
                    AlignmentError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AlignmentError::ServiceError {
                status: status.as_u16(),
                message: error_text.chars().take(512).collect(),
            });
        }

        let parsed: AlignHttpResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                AlignmentError::Timeout
            } else {
                AlignmentError::InvalidResponse(format!("Malformed alignment response: {}", e))
            }
        })?;

        Ok(parsed.tokens)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn device(&self) -> &str {
        &self.config.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use base64::Engine as _;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};

    async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn audio() -> DecodedAudio {
        DecodedAudio::new(vec![0.0; 16_000], 16_000)
    }

    #[tokio::test]
    async fn test_align_request_and_response() {
        let router = Router::new().route(
            "/v1/align",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["sample_rate"], 16_000);
                assert_eq!(body["text"], "Hello world");
                assert_eq!(body["language"], "en");
                assert_eq!(body["model"], "tiny");
                assert_eq!(body["device"], "cpu");
                assert_eq!(body["vad_filter"], true);
                assert_eq!(body["min_silence_duration_ms"], 200);

                let wav = STANDARD.decode(body["audio"].as_str().unwrap()).unwrap();
                assert_eq!(&wav[0..4], b"RIFF");
                assert_eq!(wav.len(), 44 + 32_000);

                Json(serde_json::json!({
                    "tokens": [
                        {"token": " Hello", "start": 0.0, "end": 0.32},
                        {"token": " world", "start": 0.35, "end": 0.72}
                    ]
                }))
            }),
        );
        let url = spawn_backend(router).await;
        let client = HttpAlignmentClient::new(HttpAlignmentClientConfig::new(url)).unwrap();

        let hints = AlignmentHints {
            reference_text: Some("Hello world".to_string()),
            language: Some("en".to_string()),
        };
        let tokens = client.align(&audio(), &hints).await.unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1], RawAlignmentToken::new(" world", 0.35, 0.72));
    }

    #[tokio::test]
    async fn test_optional_hints_omitted() {
        let router = Router::new().route(
            "/v1/align",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert!(body.get("text").is_none());
                assert!(body.get("language").is_none());
                Json(serde_json::json!({"tokens": []}))
            }),
        );
        let url = spawn_backend(router).await;
        let client = HttpAlignmentClient::new(HttpAlignmentClientConfig::new(url)).unwrap();

        let tokens = client.align(&audio(), &AlignmentHints::default()).await.unwrap();
        assert!(tokens.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_and_malformed_body() {
        let router = Router::new()
            .route(
                "/v1/align",
                post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "model loading").into_response() }),
            );
        let url = spawn_backend(router).await;
        let client = HttpAlignmentClient::new(HttpAlignmentClientConfig::new(url)).unwrap();
        let err = client.align(&audio(), &AlignmentHints::default()).await.unwrap_err();
        assert!(matches!(err, AlignmentError::ServiceError { status: 503, .. }));

        let router = Router::new().route("/v1/align", post(|| async { "not json" }));
        let url = spawn_backend(router).await;
        let client = HttpAlignmentClient::new(HttpAlignmentClientConfig::new(url)).unwrap();
        let err = client.align(&audio(), &AlignmentHints::default()).await.unwrap_err();
        assert!(matches!(err, AlignmentError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_audio_payload_is_base64_wav() {
        let audio = DecodedAudio::new(vec![0.5; 800], 16_000);
        let (payload, bytes) = encode_audio_payload(&audio).await.unwrap();

        let wav = STANDARD.decode(payload).unwrap();
        assert_eq!(wav.len(), bytes);
        assert_eq!(bytes, 44 + 1_600);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]), 16_000);
    }

    #[test]
    fn test_reports_model_and_device() {
        let config = HttpAlignmentClientConfig {
            model: "base".to_string(),
            device: "cuda".to_string(),
            ..HttpAlignmentClientConfig::new("http://localhost:9000/")
        };
        let client = HttpAlignmentClient::new(config).unwrap();
        assert_eq!(client.model_name(), "base");
        assert_eq!(client.device(), "cuda");
        assert_eq!(client.align_url(), "http://localhost:9000/v1/align");
    }
}

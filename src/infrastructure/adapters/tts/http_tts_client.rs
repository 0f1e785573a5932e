//! HTTP TTS Client - 调用外部 TTS HTTP 服务
//!
//! 实现 TtsEnginePort trait，后端为 OpenAI 兼容的 Kokoro 服务
//!
//! 外部 TTS API:
//! POST {base_url}/v1/audio/speech
//! Request: {"model", "input", "voice", "response_format", "speed"}  (JSON)
//! Response: 编码后的音频，格式见 Content-Type

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{PassthroughResponse, SynthesisResult, TtsEnginePort, TtsError};
use crate::domain::speech::{AudioFormat, SynthesisRequest};
use crate::infrastructure::adapters::codec::probe_stream_params;

/// 错误响应体截断长度
const MAX_ERROR_BODY: usize = 512;

/// TTS 合成请求体 (JSON)
#[derive(Debug, Serialize)]
struct SpeechHttpRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
    speed: f32,
}

/// HTTP TTS 客户端配置
#[derive(Debug, Clone)]
pub struct HttpTtsClientConfig {
    /// TTS 服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpTtsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8880".to_string(),
            timeout_secs: 120,
        }
    }
}

impl HttpTtsClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP TTS 客户端
pub struct HttpTtsClient {
    client: Client,
    base_url: String,
}

impl HttpTtsClient {
    /// 创建新的 HTTP TTS 客户端
    pub fn new(config: HttpTtsClientConfig) -> Result<Self, TtsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn speech_url(&self) -> String {
        format!("{}/v1/audio/speech", self.base_url)
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }

    fn map_send_error(e: reqwest::Error) -> TtsError {
        if e.is_timeout() {
            TtsError::Timeout
        } else if e.is_connect() {
            TtsError::NetworkError(format!("Cannot connect to TTS service: {}", e))
        } else {
            TtsError::NetworkError(e.to_string())
        }
    }
}

/// 按 Content-Type、魔数、请求格式的顺序确定实际格式
fn resolve_format(content_type: Option<&str>, data: &[u8], requested: AudioFormat) -> AudioFormat {
    content_type
        .and_then(AudioFormat::from_content_type)
        .or_else(|| AudioFormat::sniff(data))
        .unwrap_or(requested)
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[async_trait]
impl TtsEnginePort for HttpTtsClient {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisResult, TtsError> {
        let body = SpeechHttpRequest {
            model: &request.model,
            input: request.text.as_str(),
            voice: request.voice.as_str(),
            response_format: request.format.as_str(),
            speed: request.speed.value(),
        };

        tracing::debug!(
            url = %self.speech_url(),
            voice = %request.voice,
            format = %request.format,
            text_len = body.input.len(),
            "Sending TTS speech request"
        );

        let response = self
            .client
            .post(self.speech_url())
            .json(&body)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TtsError::ServiceError {
                status: status.as_u16(),
                message: truncate_body(&error_text),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout
                } else {
                    TtsError::InvalidResponse(format!("Failed to read audio: {}", e))
                }
            })?
            .to_vec();

        let format = resolve_format(content_type.as_deref(), &audio_data, request.format);
        let params = probe_stream_params(&audio_data, format);

        tracing::debug!(
            content_type = ?content_type,
            format = %format,
            audio_size = audio_data.len(),
            sample_rate = ?params.sample_rate,
            channels = ?params.channels,
            "TTS speech response received"
        );

        Ok(SynthesisResult {
            audio_data,
            format,
            content_type,
            sample_rate: params.sample_rate,
            channels: params.channels,
        })
    }

    async fn passthrough_get(&self, path: &str) -> Result<PassthroughResponse, TtsError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| TtsError::InvalidResponse(format!("Failed to read body: {}", e)))?
            .to_vec();

        tracing::debug!(url = %url, status = status, bytes = body.len(), "Proxied GET");

        Ok(PassthroughResponse {
            status,
            content_type,
            body,
        })
    }

    fn backend_url(&self) -> &str {
        &self.base_url
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

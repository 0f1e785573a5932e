//! Fake TTS Client - 用于本地联调和测试的 TTS 客户端
//!
//! 不调用外部服务，按单词数生成正弦音 WAV

use async_trait::async_trait;
use std::time::Duration;

use crate::application::ports::{PassthroughResponse, SynthesisResult, TtsEnginePort, TtsError};
use crate::domain::speech::{AudioFormat, SynthesisRequest};
use crate::infrastructure::adapters::codec::encode_wav_pcm16;

/// Fake TTS Client 配置
#[derive(Debug, Clone)]
pub struct FakeTtsClientConfig {
    /// 输出采样率
    pub sample_rate: u32,
    /// 每个单词的发音时长（毫秒，语速 1.0 时）
    pub word_ms: u64,
    /// 单词之间的静音（毫秒，语速 1.0 时）
    pub gap_ms: u64,
    /// 模拟推理延迟
    pub latency_ms: u64,
}

impl Default for FakeTtsClientConfig {
    fn default() -> Self {
        Self {
            sample_rate: 24_000,
            word_ms: 300,
            gap_ms: 50,
            latency_ms: 0,
        }
    }
}

/// Fake TTS Client
pub struct FakeTtsClient {
    config: FakeTtsClientConfig,
}

impl FakeTtsClient {
    pub fn new(config: FakeTtsClientConfig) -> Self {
        tracing::info!(
            sample_rate = config.sample_rate,
            word_ms = config.word_ms,
            "FakeTtsClient initialized"
        );
        Self { config }
    }

    /// 每个单词一段正弦音，后接静音
    fn render(&self, words: usize, speed: f32) -> Vec<f32> {
        let rate = self.config.sample_rate as f64;
        let speed = speed.max(0.1) as f64;
        let word_len = (self.config.word_ms as f64 * rate / 1000.0 / speed) as usize;
        let gap_len = (self.config.gap_ms as f64 * rate / 1000.0 / speed) as usize;

        let mut samples = Vec::with_capacity(words * (word_len + gap_len));
        for word in 0..words {
            let freq = 220.0 + 40.0 * (word % 5) as f64;
            samples.extend((0..word_len).map(|i| {
                (2.0 * std::f64::consts::PI * freq * i as f64 / rate).sin() as f32 * 0.3
            }));
            samples.extend(std::iter::repeat(0.0).take(gap_len));
        }
        samples
    }
}

impl Default for FakeTtsClient {
    fn default() -> Self {
        Self::new(FakeTtsClientConfig::default())
    }
}

#[async_trait]
impl TtsEnginePort for FakeTtsClient {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisResult, TtsError> {
        tracing::debug!(
            words = request.text.word_count(),
            voice = %request.voice,
            "FakeTtsClient: rendering tone audio"
        );

        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }

        let samples = self.render(request.text.word_count(), request.speed.value());
        Ok(SynthesisResult {
            audio_data: encode_wav_pcm16(&samples, self.config.sample_rate),
            format: AudioFormat::Wav,
            content_type: Some(AudioFormat::Wav.content_type().to_string()),
            sample_rate: Some(self.config.sample_rate),
            channels: Some(1),
        })
    }

    async fn passthrough_get(&self, path: &str) -> Result<PassthroughResponse, TtsError> {
        if path == "/v1/models" {
            let body = serde_json::json!({
                "object": "list",
                "data": [{"id": "tts-1", "object": "model", "owned_by": "fake"}],
            });
            return Ok(PassthroughResponse {
                status: 200,
                content_type: Some("application/json".to_string()),
                body: body.to_string().into_bytes(),
            });
        }

        Ok(PassthroughResponse {
            status: 404,
            content_type: Some("text/plain".to_string()),
            body: b"Not Found".to_vec(),
        })
    }

    fn backend_url(&self) -> &str {
        "fake://tts"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::speech::{Speed, SpeechText, VoiceTable};
    use std::collections::HashMap;

    fn request(text: &str, speed: f32) -> SynthesisRequest {
        let table = VoiceTable::new(["af_bella"], &HashMap::new(), "en").unwrap();
        SynthesisRequest {
            text: SpeechText::new(text).unwrap(),
            voice: table.resolve("af_bella").unwrap(),
            format: AudioFormat::Mp3,
            speed: Speed::new(speed).unwrap(),
            model: "tts-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_duration_scales_with_words_and_speed() {
        let client = FakeTtsClient::default();

        let normal = client.synthesize(&request("one two", 1.0)).await.unwrap();
        assert_eq!(normal.format, AudioFormat::Wav);
        // 2 词 * (300 + 50)ms * 24kHz * 2 字节 + 头
        assert_eq!(normal.audio_data.len(), 44 + 2 * 8_400 * 2);

        let fast = client.synthesize(&request("one two", 2.0)).await.unwrap();
        assert!(fast.audio_data.len() < normal.audio_data.len());
    }

    #[tokio::test]
    async fn test_models_listing() {
        let client = FakeTtsClient::default();
        let models = client.passthrough_get("/v1/models").await.unwrap();
        assert_eq!(models.status, 200);
        assert_eq!(client.passthrough_get("/web/").await.unwrap().status, 404);
    }
}

//! Speech Command Handlers

use std::sync::Arc;

use crate::application::commands::speech_commands::*;
use crate::application::error::GatewayError;
use crate::application::ports::{AlignmentHints, SynthesisResult};
use crate::application::services::{
    AlignmentService, CodecRunner, ConcurrencyGovernor, PermitLease, SynthesisClient,
};
use crate::domain::alignment::{compose, WordTiming};
use crate::domain::{detect_language, language_hint};

/// SynthesizeSpeech Handler - 合成语音
pub struct SynthesizeSpeechHandler {
    synthesis: Arc<SynthesisClient>,
    codec: Arc<CodecRunner>,
    governor: Arc<ConcurrencyGovernor>,
}

impl SynthesizeSpeechHandler {
    pub fn new(
        synthesis: Arc<SynthesisClient>,
        codec: Arc<CodecRunner>,
        governor: Arc<ConcurrencyGovernor>,
    ) -> Self {
        Self {
            synthesis,
            codec,
            governor,
        }
    }

    pub async fn handle(
        &self,
        cmd: SynthesizeSpeechCommand,
    ) -> Result<SynthesizeSpeechResponse, GatewayError> {
        let request = self.synthesis.prepare(&cmd.params)?;

        let permit = self.governor.acquire().await?;

        let result = self.synthesis.synthesize(&request).await?;
        let audio = self
            .codec
            .transcode(result.audio_data, result.format, request.format, permit.lease())
            .await?;

        Ok(SynthesizeSpeechResponse {
            audio,
            format: request.format,
        })
    }
}

/// SpeechWithAlignment Handler - 合成并返回单词时间戳
pub struct SpeechWithAlignmentHandler {
    synthesis: Arc<SynthesisClient>,
    alignment: Arc<AlignmentService>,
    codec: Arc<CodecRunner>,
    governor: Arc<ConcurrencyGovernor>,
}

impl SpeechWithAlignmentHandler {
    pub fn new(
        synthesis: Arc<SynthesisClient>,
        alignment: Arc<AlignmentService>,
        codec: Arc<CodecRunner>,
        governor: Arc<ConcurrencyGovernor>,
    ) -> Self {
        Self {
            synthesis,
            alignment,
            codec,
            governor,
        }
    }

    pub async fn handle(
        &self,
        cmd: SpeechWithAlignmentCommand,
    ) -> Result<SpeechWithAlignmentResponse, GatewayError> {
        let request = self.synthesis.prepare(&cmd.params)?;
        let language = language_hint(cmd.language.as_deref())
            .unwrap_or_else(|| detect_language(request.text.as_str()).to_string());

        let permit = self.governor.acquire().await?;

        let result = self.synthesis.synthesize(&request).await?;

        // 对齐阶段的任何失败都只降级，不影响音频返回
        let aligned = self
            .align(request.text.as_str(), &result, &language, permit.lease())
            .await;
        let (words, warning) = match aligned {
            Ok(words) => (words, None),
            Err(e) => {
                tracing::warn!(
                    voice = %request.voice,
                    language = %language,
                    error = %e,
                    "Alignment degraded, returning audio without word timings"
                );
                (Vec::new(), Some(format!("Word alignment unavailable: {}", e)))
            }
        };

        let audio = self
            .codec
            .transcode(result.audio_data, result.format, request.format, permit.lease())
            .await?;

        tracing::info!(
            voice = %request.voice,
            format = %request.format,
            words = words.len(),
            degraded = warning.is_some(),
            "Speech with alignment completed"
        );

        Ok(SpeechWithAlignmentResponse {
            audio,
            format: request.format,
            words,
            language,
            warning,
        })
    }

    async fn align(
        &self,
        text: &str,
        result: &SynthesisResult,
        language: &str,
        lease: PermitLease,
    ) -> Result<Vec<WordTiming>, GatewayError> {
        let decoded = self
            .codec
            .decode(result.audio_data.clone(), result.format, lease)
            .await?;

        let hints = AlignmentHints {
            reference_text: Some(text.to_string()),
            language: Some(language.to_string()),
        };
        let tokens = self.alignment.align(&decoded, &hints).await?;

        Ok(compose(text, &tokens, decoded.duration_secs))
    }
}

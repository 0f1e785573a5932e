//! Alignment Command Handlers

use std::sync::Arc;

use crate::application::commands::alignment_commands::*;
use crate::application::error::GatewayError;
use crate::application::ports::AlignmentHints;
use crate::application::services::{AlignmentService, CodecRunner, ConcurrencyGovernor};
use crate::domain::alignment::{compose, words_from_tokens};
use crate::domain::language_hint;
use crate::domain::speech::AudioFormat;

/// AlignAudio Handler - 对调用方上传的音频做单词对齐
pub struct AlignAudioHandler {
    alignment: Arc<AlignmentService>,
    codec: Arc<CodecRunner>,
    governor: Arc<ConcurrencyGovernor>,
}

impl AlignAudioHandler {
    pub fn new(
        alignment: Arc<AlignmentService>,
        codec: Arc<CodecRunner>,
        governor: Arc<ConcurrencyGovernor>,
    ) -> Self {
        Self {
            alignment,
            codec,
            governor,
        }
    }

    pub async fn handle(&self, cmd: AlignAudioCommand) -> Result<AlignAudioResponse, GatewayError> {
        if cmd.audio.len() < MIN_AUDIO_BYTES {
            return Err(GatewayError::invalid_parameter("Audio file too small"));
        }

        let format = AudioFormat::sniff(&cmd.audio).ok_or_else(|| {
            GatewayError::DecodeError("unrecognized audio container".to_string())
        })?;

        let text = cmd
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let hints = AlignmentHints {
            reference_text: text.clone(),
            language: language_hint(cmd.language.as_deref()),
        };

        let permit = self.governor.acquire().await?;

        let decoded = self.codec.decode(cmd.audio, format, permit.lease()).await?;
        let tokens = self.alignment.align(&decoded, &hints).await?;

        let words = match &text {
            Some(text) => compose(text, &tokens, decoded.duration_secs),
            None => words_from_tokens(&tokens),
        };

        tracing::info!(
            format = %format,
            duration_secs = decoded.duration_secs,
            tokens = tokens.len(),
            words = words.len(),
            "Alignment request completed"
        );

        Ok(AlignAudioResponse {
            words,
            format,
            duration_secs: decoded.duration_secs,
        })
    }
}

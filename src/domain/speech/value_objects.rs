//! Speech Context - Value Objects

use serde::{Deserialize, Serialize};

use super::errors::SpeechError;
use super::voice_table::VoiceId;

/// 语速下限
pub const MIN_SPEED: f32 = 0.5;
/// 语速上限
pub const MAX_SPEED: f32 = 2.0;
/// 单次请求允许的最大单词数
pub const MAX_INPUT_WORDS: usize = 500;
/// 默认模型名（OpenAI 兼容）
pub const DEFAULT_MODEL: &str = "tts-1";

/// 音频容器格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Wav,
    /// Opus (OGG 容器)
    Opus,
    Flac,
}

impl AudioFormat {
    pub const ALL: [AudioFormat; 4] = [
        AudioFormat::Mp3,
        AudioFormat::Wav,
        AudioFormat::Opus,
        AudioFormat::Flac,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Opus => "opus",
            Self::Flac => "flac",
        }
    }

    /// HTTP Content-Type
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
            Self::Opus => "audio/opus",
            Self::Flac => "audio/flac",
        }
    }

    /// 根据后端声明的 MIME 类型推断格式（忽略参数部分，如 `; codecs=opus`）
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match mime.as_str() {
            "audio/mpeg" | "audio/mp3" | "audio/mpeg3" => Some(Self::Mp3),
            "audio/wav" | "audio/wave" | "audio/x-wav" | "audio/vnd.wave" => Some(Self::Wav),
            "audio/opus" | "audio/ogg" => Some(Self::Opus),
            "audio/flac" | "audio/x-flac" => Some(Self::Flac),
            _ => None,
        }
    }

    /// 根据魔数探测容器格式
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WAVE" {
            return Some(Self::Wav);
        }
        if data.starts_with(b"fLaC") {
            return Some(Self::Flac);
        }
        if data.starts_with(b"OggS") {
            // 第一页的第一个包必须是 OpusHead，否则可能是 Vorbis 等不支持的编码
            let is_opus = data
                .windows(8)
                .take(64)
                .any(|w| w == b"OpusHead");
            return is_opus.then_some(Self::Opus);
        }
        if data.starts_with(b"ID3") {
            return Some(Self::Mp3);
        }
        // MPEG 帧同步字
        if data.len() >= 2 && data[0] == 0xFF && (data[1] & 0xE0) == 0xE0 {
            return Some(Self::Mp3);
        }
        None
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AudioFormat {
    type Err = SpeechError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "wav" => Ok(Self::Wav),
            "opus" => Ok(Self::Opus),
            "flac" => Ok(Self::Flac),
            other => Err(SpeechError::invalid_parameter(format!(
                "Unsupported response_format '{}', expected one of: mp3, wav, opus, flac",
                other
            ))),
        }
    }
}

/// 语速 (0.5 - 2.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Speed(f32);

impl Speed {
    pub fn new(value: f32) -> Result<Self, SpeechError> {
        if !value.is_finite() || !(MIN_SPEED..=MAX_SPEED).contains(&value) {
            return Err(SpeechError::invalid_parameter(format!(
                "speed must be between {} and {}, got {}",
                MIN_SPEED, MAX_SPEED, value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self(1.0)
    }
}

/// 待合成文本
///
/// 不变量:
/// - 至少包含一个非空白字符
/// - 按空白分词后不超过 MAX_INPUT_WORDS 个单词
/// - 原文原样保存，单词时间戳以原文为准
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechText(String);

impl SpeechText {
    pub fn new(text: impl Into<String>) -> Result<Self, SpeechError> {
        let text = text.into();
        let word_count = text.split_whitespace().count();
        if word_count == 0 {
            return Err(SpeechError::invalid_parameter("input text must not be empty"));
        }
        if word_count > MAX_INPUT_WORDS {
            return Err(SpeechError::invalid_parameter(format!(
                "input text has {} words, the limit is {}",
                word_count, MAX_INPUT_WORDS
            )));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn word_count(&self) -> usize {
        self.0.split_whitespace().count()
    }

    /// 日志用的截断预览
    pub fn preview(&self, max_chars: usize) -> String {
        let mut preview: String = self.0.chars().take(max_chars).collect();
        if self.0.chars().count() > max_chars {
            preview.push_str("...");
        }
        preview
    }
}

/// 合成请求（已校验，构造后不可变）
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: SpeechText,
    pub voice: VoiceId,
    pub format: AudioFormat,
    pub speed: Speed,
    pub model: String,
}

//! Alignment Commands - 对齐相关命令

use crate::domain::alignment::WordTiming;
use crate::domain::speech::AudioFormat;

/// 可对齐音频的最小字节数
pub const MIN_AUDIO_BYTES: usize = 100;

/// 对齐音频命令
#[derive(Debug, Clone)]
pub struct AlignAudioCommand {
    /// 原始音频（容器格式由魔数识别）
    pub audio: Vec<u8>,
    pub language: Option<String>,
    /// 参考文本；提供时单词以该文本为准
    pub text: Option<String>,
}

/// 对齐音频响应
#[derive(Debug, Clone)]
pub struct AlignAudioResponse {
    pub words: Vec<WordTiming>,
    pub format: AudioFormat,
    pub duration_secs: f64,
}

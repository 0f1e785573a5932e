//! Speech Commands - 合成相关命令

use crate::application::services::SpeechParams;
use crate::domain::alignment::WordTiming;
use crate::domain::speech::AudioFormat;

/// 合成语音命令
#[derive(Debug, Clone)]
pub struct SynthesizeSpeechCommand {
    pub params: SpeechParams,
}

/// 合成语音响应
#[derive(Debug, Clone)]
pub struct SynthesizeSpeechResponse {
    pub audio: Vec<u8>,
    pub format: AudioFormat,
}

impl SynthesizeSpeechResponse {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

/// 合成并对齐命令
#[derive(Debug, Clone)]
pub struct SpeechWithAlignmentCommand {
    pub params: SpeechParams,
    /// 语言提示；为 None 时根据输入文本检测
    pub language: Option<String>,
}

/// 合成并对齐响应
///
/// 对齐阶段失败时仍返回音频，`words` 为空并附带 `warning`
#[derive(Debug, Clone)]
pub struct SpeechWithAlignmentResponse {
    pub audio: Vec<u8>,
    pub format: AudioFormat,
    pub words: Vec<WordTiming>,
    pub language: String,
    pub warning: Option<String>,
}

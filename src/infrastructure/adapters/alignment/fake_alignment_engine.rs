//! Fake Alignment Engine - 用于本地联调和测试的对齐后端
//!
//! 把参考文本的单词均匀铺满音频时长，模拟转写输出（小写、去标点）

use async_trait::async_trait;

use crate::application::ports::{
    AlignmentEnginePort, AlignmentError, AlignmentHints, DecodedAudio,
};
use crate::domain::alignment::{normalize_key, RawAlignmentToken};

/// 单词之间留出的静音比例
const GAP_RATIO: f64 = 0.1;

pub struct FakeAlignmentEngine {
    model: String,
}

impl FakeAlignmentEngine {
    pub fn new() -> Self {
        Self {
            model: "fake".to_string(),
        }
    }
}

impl Default for FakeAlignmentEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AlignmentEnginePort for FakeAlignmentEngine {
    async fn align(
        &self,
        audio: &DecodedAudio,
        hints: &AlignmentHints,
    ) -> Result<Vec<RawAlignmentToken>, AlignmentError> {
        if audio.is_empty() {
            return Ok(Vec::new());
        }

        let words: Vec<String> = match hints.reference_text.as_deref() {
            Some(text) => text
                .split_whitespace()
                .map(normalize_key)
                .filter(|k| !k.is_empty())
                .collect(),
            // 没有参考文本时每秒输出一个占位 token
            None => (0..audio.duration_secs.ceil().max(1.0) as usize)
                .map(|_| "speech".to_string())
                .collect(),
        };

        if words.is_empty() {
            return Ok(Vec::new());
        }

        let slot = audio.duration_secs / words.len() as f64;
        let tokens = words
            .into_iter()
            .enumerate()
            .map(|(idx, word)| {
                let start = idx as f64 * slot;
                RawAlignmentToken::new(word, start, start + slot * (1.0 - GAP_RATIO))
            })
            .collect();

        Ok(tokens)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn device(&self) -> &str {
        "cpu"
    }
}

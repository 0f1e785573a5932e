//! Speech Context - 语音合成上下文
//!
//! 合成请求的参数校验与音色解析

mod errors;
mod value_objects;
mod voice_table;

pub use errors::SpeechError;
pub use value_objects::{
    AudioFormat, Speed, SpeechText, SynthesisRequest, DEFAULT_MODEL, MAX_INPUT_WORDS, MAX_SPEED,
    MIN_SPEED,
};
pub use voice_table::{VoiceId, VoiceTable};

//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod alignment_engine;
mod audio_codec;
mod tts_engine;

pub use alignment_engine::{AlignmentEnginePort, AlignmentError, AlignmentHints};
pub use audio_codec::{AudioCodecPort, CodecError, DecodedAudio, ALIGNMENT_SAMPLE_RATE};
pub use tts_engine::{PassthroughResponse, SynthesisResult, TtsEnginePort, TtsError};

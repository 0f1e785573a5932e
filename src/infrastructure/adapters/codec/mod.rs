//! Codec Adapter - 音频编解码实现

mod opus_ogg;
mod probe;
mod resample;
mod symphonia_codec;
mod wav;

pub use probe::{probe_stream_params, StreamParams};
pub use symphonia_codec::{SymphoniaCodec, DEFAULT_OPUS_BITRATE};
pub use wav::encode_wav_pcm16;

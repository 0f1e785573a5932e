//! Symphonia Codec - 音频编解码适配器
//!
//! 解码：wav/mp3/flac 走 symphonia，opus 走 Ogg 解复用 + libopus
//! 编码：wav (PCM16)、opus (Ogg)；mp3/flac 无可用编码器

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::opus_ogg::{decode_ogg_opus, encode_ogg_opus};
use super::resample::{downmix_to_mono, resample};
use super::wav::encode_wav_pcm16;
use crate::application::ports::{AudioCodecPort, CodecError, DecodedAudio};
use crate::domain::speech::AudioFormat;

/// Opus 默认比特率
pub const DEFAULT_OPUS_BITRATE: u32 = 32_000;

/// 音频编解码器
pub struct SymphoniaCodec {
    opus_bitrate: u32,
}

impl SymphoniaCodec {
    pub fn new(opus_bitrate: u32) -> Self {
        Self { opus_bitrate }
    }

    /// 使用 symphonia 解码，返回单声道样本和原始采样率
    fn decode_with_symphonia(
        &self,
        data: &[u8],
        format: AudioFormat,
    ) -> Result<(Vec<f32>, u32), CodecError> {
        let cursor = Cursor::new(data.to_vec());
        let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

        let mut hint = Hint::new();
        hint.with_extension(format.as_str());
        hint.mime_type(format.content_type());

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| CodecError::DecodingError(format!("Probe failed: {}", e)))?;

        let mut reader = probed.format;

        let track = reader
            .default_track()
            .ok_or_else(|| CodecError::DecodingError("No audio track found".to_string()))?;
        let track_id = track.id;
        let expected_frames = track.codec_params.n_frames;
        let mut sample_rate = track.codec_params.sample_rate;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| CodecError::DecodingError(format!("Decoder creation failed: {}", e)))?;

        let mut samples: Vec<f32> = Vec::new();

        loop {
            let packet = match reader.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    return Err(CodecError::DecodingError(format!(
                        "Packet read error: {}",
                        e
                    )));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            // 损坏的包直接失败，不返回部分样本
            let decoded = decoder
                .decode(&packet)
                .map_err(|e| CodecError::DecodingError(format!("Decode error: {}", e)))?;

            let spec = *decoded.spec();
            sample_rate.get_or_insert(spec.rate);
            let num_frames = decoded.frames();
            let channels = spec.channels.count();

            let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);
            let actual = num_frames * channels;
            samples.extend(downmix_to_mono(&sample_buf.samples()[..actual], channels));
        }

        let sample_rate = sample_rate
            .ok_or_else(|| CodecError::DecodingError("Unknown sample rate".to_string()))?;

        // 容器声明的帧数多于实际读到的帧数说明数据被截断
        if let Some(expected) = expected_frames {
            if (samples.len() as u64) + truncation_tolerance(format, expected) < expected {
                return Err(CodecError::DecodingError(format!(
                    "Audio truncated: expected {} frames, got {}",
                    expected,
                    samples.len()
                )));
            }
        }

        Ok((samples, sample_rate))
    }
}

/// 允许的帧数缺口
///
/// WAV 的 data 块长度与 FLAC 的 STREAMINFO 总帧数都是精确值，少一帧即为截断；
/// MP3 的帧数来自 Xing/LAME 头的估算，留出两帧余量
fn truncation_tolerance(format: AudioFormat, expected: u64) -> u64 {
    match format {
        AudioFormat::Mp3 => (expected / 100).max(2_304),
        _ => 0,
    }
}

impl Default for SymphoniaCodec {
    fn default() -> Self {
        Self::new(DEFAULT_OPUS_BITRATE)
    }
}

impl AudioCodecPort for SymphoniaCodec {
    fn decode_to(
        &self,
        data: &[u8],
        format: AudioFormat,
        target_rate: Option<u32>,
    ) -> Result<DecodedAudio, CodecError> {
        if data.is_empty() {
            return Err(CodecError::InvalidInput("Empty audio payload".to_string()));
        }

        let (samples, sample_rate) = match format {
            AudioFormat::Opus => decode_ogg_opus(data)?,
            _ => self.decode_with_symphonia(data, format)?,
        };

        if samples.is_empty() {
            return Err(CodecError::DecodingError(
                "Audio contains no samples".to_string(),
            ));
        }

        let (samples, sample_rate) = match target_rate {
            Some(rate) if rate != sample_rate => (resample(&samples, sample_rate, rate), rate),
            _ => (samples, sample_rate),
        };

        let audio = DecodedAudio::new(samples, sample_rate);
        tracing::debug!(
            format = %format,
            input_bytes = data.len(),
            sample_rate = audio.sample_rate,
            duration_secs = audio.duration_secs,
            "Decoded audio"
        );
        Ok(audio)
    }

    fn encode(&self, audio: &DecodedAudio, format: AudioFormat) -> Result<Vec<u8>, CodecError> {
        match format {
            AudioFormat::Wav => Ok(encode_wav_pcm16(&audio.samples, audio.sample_rate)),
            AudioFormat::Opus => {
                let ogg = encode_ogg_opus(&audio.samples, audio.sample_rate, self.opus_bitrate)?;
                tracing::debug!(
                    samples = audio.samples.len(),
                    opus_size = ogg.len(),
                    bitrate = self.opus_bitrate,
                    "Encoded to Opus"
                );
                Ok(ogg)
            }
            AudioFormat::Mp3 | AudioFormat::Flac => Err(CodecError::UnsupportedFormat(format!(
                "encoding to {} is not supported",
                format
            ))),
        }
    }

    fn supports_encoding(&self, format: AudioFormat) -> bool {
        matches!(format, AudioFormat::Wav | AudioFormat::Opus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(seconds: f32, rate: u32) -> Vec<f32> {
        let n = (seconds * rate as f32) as usize;
        (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * 220.0 * i as f32 / rate as f32).sin() * 0.5)
            .collect()
    }

    /// 双声道 16 位 WAV，左右声道分别为常量
    fn stereo_wav(left: i16, right: i16, frames: usize, rate: u32) -> Vec<u8> {
        let data_size = frames * 4;
        let mut wav = Vec::with_capacity(44 + data_size);
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + data_size as u32).to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes());
        wav.extend_from_slice(&2u16.to_le_bytes());
        wav.extend_from_slice(&rate.to_le_bytes());
        wav.extend_from_slice(&(rate * 4).to_le_bytes());
        wav.extend_from_slice(&4u16.to_le_bytes());
        wav.extend_from_slice(&16u16.to_le_bytes());
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&(data_size as u32).to_le_bytes());
        for _ in 0..frames {
            wav.extend_from_slice(&left.to_le_bytes());
            wav.extend_from_slice(&right.to_le_bytes());
        }
        wav
    }

    #[test]
    fn test_wav_decode_resamples_to_alignment_rate() {
        let codec = SymphoniaCodec::default();
        let wav = encode_wav_pcm16(&tone(1.0, 24_000), 24_000);

        let native = codec.decode_to(&wav, AudioFormat::Wav, None).unwrap();
        assert_eq!(native.sample_rate, 24_000);
        assert_eq!(native.samples.len(), 24_000);

        let aligned = codec.decode(&wav, AudioFormat::Wav).unwrap();
        assert_eq!(aligned.sample_rate, 16_000);
        assert!((aligned.duration_secs - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_wav_round_trip() {
        let codec = SymphoniaCodec::default();
        let wav = encode_wav_pcm16(&tone(0.5, 16_000), 16_000);

        let first = codec.decode(&wav, AudioFormat::Wav).unwrap();
        let reencoded = codec.encode(&first, AudioFormat::Wav).unwrap();
        let second = codec.decode(&reencoded, AudioFormat::Wav).unwrap();

        assert_eq!(first.samples.len(), second.samples.len());
        let max_diff = first
            .samples
            .iter()
            .zip(&second.samples)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f32, f32::max);
        assert!(max_diff < 1e-3);
    }

    #[test]
    fn test_stereo_is_downmixed() {
        let codec = SymphoniaCodec::default();
        let wav = stereo_wav(16_384, -16_384, 16_000, 16_000);

        let audio = codec.decode(&wav, AudioFormat::Wav).unwrap();
        assert_eq!(audio.samples.len(), 16_000);
        assert!(audio.samples.iter().all(|s| s.abs() < 1e-3));
    }

    #[test]
    fn test_opus_round_trip_through_port() {
        let codec = SymphoniaCodec::default();
        let wav = encode_wav_pcm16(&tone(1.0, 24_000), 24_000);

        let opus = codec
            .transcode(wav.clone(), AudioFormat::Wav, AudioFormat::Opus)
            .unwrap();
        assert_eq!(AudioFormat::sniff(&opus), Some(AudioFormat::Opus));
        assert!(opus.len() < wav.len());

        let decoded = codec.decode(&opus, AudioFormat::Opus).unwrap();
        assert_eq!(decoded.sample_rate, 16_000);
        assert!((decoded.duration_secs - 1.0).abs() < 0.03);
    }

    #[test]
    fn test_opus_decode_encode_decode_round_trip() {
        let codec = SymphoniaCodec::default();
        let source = encode_ogg_opus(&tone(1.0, 24_000), 24_000, DEFAULT_OPUS_BITRATE).unwrap();

        let first = codec.decode(&source, AudioFormat::Opus).unwrap();
        let reencoded = codec.encode(&first, AudioFormat::Opus).unwrap();
        assert_eq!(AudioFormat::sniff(&reencoded), Some(AudioFormat::Opus));
        let second = codec.decode(&reencoded, AudioFormat::Opus).unwrap();

        assert_eq!(first.sample_rate, second.sample_rate);
        let diff = first.samples.len().abs_diff(second.samples.len());
        assert!(diff <= 160, "length drifted by {} samples", diff);
        assert!((first.duration_secs - second.duration_secs).abs() < 0.01);
        assert!((second.duration_secs - 1.0).abs() < 0.03);

        let energy = |s: &[f32]| s.iter().map(|x| x * x).sum::<f32>() / s.len() as f32;
        assert!(energy(&second.samples) > energy(&first.samples) * 0.5);
    }

    #[test]
    fn test_truncated_wav_is_decode_error() {
        let codec = SymphoniaCodec::default();
        let wav = encode_wav_pcm16(&tone(1.0, 16_000), 16_000);

        let err = codec
            .decode(&wav[..wav.len() / 2], AudioFormat::Wav)
            .unwrap_err();
        assert!(!err.is_encoding());
    }

    #[test]
    fn test_wav_missing_tail_is_decode_error() {
        let codec = SymphoniaCodec::default();
        let wav = encode_wav_pcm16(&tone(1.0, 24_000), 24_000);

        // 去掉最后 2000 帧（约 83ms）
        let cut = &wav[..wav.len() - 4_000];
        let err = codec.decode_to(cut, AudioFormat::Wav, None).unwrap_err();
        assert!(!err.is_encoding());
        assert!(err.to_string().contains("truncated"), "{}", err);

        // 不足一帧的尾部缺失同样拒绝
        let odd = &wav[..wav.len() - 1];
        assert!(codec.decode_to(odd, AudioFormat::Wav, None).is_err());
    }

    #[test]
    fn test_truncation_tolerance_only_for_mp3() {
        assert_eq!(truncation_tolerance(AudioFormat::Wav, 24_000), 0);
        assert_eq!(truncation_tolerance(AudioFormat::Flac, 441_000), 0);
        assert_eq!(truncation_tolerance(AudioFormat::Mp3, 24_000), 2_304);
        assert_eq!(truncation_tolerance(AudioFormat::Mp3, 1_000_000), 10_000);
    }

    #[test]
    fn test_garbage_and_empty_rejected() {
        let codec = SymphoniaCodec::default();
        assert!(codec.decode(&[], AudioFormat::Wav).is_err());
        assert!(codec.decode(&[0x42; 512], AudioFormat::Flac).is_err());
        assert!(codec.decode(b"RIFF", AudioFormat::Wav).is_err());
    }

    #[test]
    fn test_unsupported_encode_targets() {
        let codec = SymphoniaCodec::default();
        let audio = DecodedAudio::new(vec![0.0; 160], 16_000);

        assert!(codec.encode(&audio, AudioFormat::Mp3).unwrap_err().is_encoding());
        assert!(codec.encode(&audio, AudioFormat::Flac).is_err());
        assert!(!codec.supports_encoding(AudioFormat::Mp3));

        let same = codec
            .transcode(vec![1, 2, 3], AudioFormat::Mp3, AudioFormat::Mp3)
            .unwrap();
        assert_eq!(same, vec![1, 2, 3]);
    }
}

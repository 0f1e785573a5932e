//! Opus (Ogg 容器) 编解码，遵循 RFC 7845

use std::io::Cursor;

use ogg::reading::PacketReader;
use ogg::writing::PacketWriter;
use ogg::PacketWriteEndInfo;
use opus::{Application, Channels, Decoder, Encoder};

use super::resample::{downmix_to_mono, opus_compatible_rate, resample};
use super::wav::to_i16;
use crate::application::ports::CodecError;

/// Opus 解码输出采样率；granule position 也以此为单位
pub const OPUS_DECODE_RATE: u32 = 48_000;

/// 单个 Opus 包最多 120ms
const MAX_FRAME_SAMPLES: usize = 5_760;

/// 将单声道样本编码为 Ogg Opus
pub fn encode_ogg_opus(
    samples: &[f32],
    sample_rate: u32,
    bitrate: u32,
) -> Result<Vec<u8>, CodecError> {
    let encode_rate = opus_compatible_rate(sample_rate);
    let samples = resample(samples, sample_rate, encode_rate);

    // Application::Voip 针对语音优化
    let mut encoder = Encoder::new(encode_rate, Channels::Mono, Application::Voip).map_err(|e| {
        CodecError::EncodingError(format!("Failed to create Opus encoder: {}", e))
    })?;
    encoder
        .set_bitrate(opus::Bitrate::Bits(bitrate as i32))
        .map_err(|e| CodecError::EncodingError(format!("Failed to set bitrate: {}", e)))?;

    // 编码器延迟，单位为编码采样率下的样本数
    let lookahead = encoder.get_lookahead().map(|l| l as usize).unwrap_or(0);

    // RFC 7845: pre-skip 与 granule position 都以 48kHz 计
    let granule_scale = OPUS_DECODE_RATE as f64 / encode_rate as f64;
    let pre_skip_48k = (lookahead as f64 * granule_scale).round() as u64;
    let total_48k = pre_skip_48k + (samples.len() as f64 * granule_scale).round() as u64;

    let pcm: Vec<i16> = samples.iter().map(|&s| to_i16(s)).collect();

    // 20ms 帧
    let frame_size = (encode_rate as usize * 20) / 1000;
    let frame_granule = (frame_size as f64 * granule_scale) as u64;
    // 额外的静音帧把编码器缓冲区中的尾部样本冲出来
    let flush_frames = ((lookahead + frame_size - 1) / frame_size).max(1);

    let mut ogg_data = Vec::new();
    {
        let mut writer = PacketWriter::new(&mut ogg_data);

        let head = opus_head(1, encode_rate, pre_skip_48k as u16);
        writer
            .write_packet(head, 0, PacketWriteEndInfo::EndPage, 0)
            .map_err(|e| CodecError::EncodingError(format!("Failed to write Opus head: {}", e)))?;
        writer
            .write_packet(opus_tags(), 0, PacketWriteEndInfo::EndPage, 0)
            .map_err(|e| CodecError::EncodingError(format!("Failed to write Opus tags: {}", e)))?;

        let silence = vec![0i16; frame_size];
        let frames: Vec<&[i16]> = pcm
            .chunks(frame_size)
            .chain(std::iter::repeat(silence.as_slice()).take(flush_frames))
            .collect();
        let frame_count = frames.len();

        let mut output = vec![0u8; 4000];
        let mut granule_pos = pre_skip_48k;

        for (idx, chunk) in frames.into_iter().enumerate() {
            // 最后一帧不完整时补零
            let frame = if chunk.len() < frame_size {
                let mut padded = chunk.to_vec();
                padded.resize(frame_size, 0);
                padded
            } else {
                chunk.to_vec()
            };

            let encoded_len = encoder
                .encode(&frame, &mut output)
                .map_err(|e| CodecError::EncodingError(format!("Opus encode failed: {}", e)))?;

            // 最后一个包的 granule position 标记真实长度，解码端据此裁掉补零
            granule_pos = (granule_pos + frame_granule).min(total_48k);
            let end_info = if idx + 1 == frame_count {
                granule_pos = total_48k;
                PacketWriteEndInfo::EndStream
            } else {
                PacketWriteEndInfo::NormalPacket
            };

            writer
                .write_packet(output[..encoded_len].to_vec(), 0, end_info, granule_pos)
                .map_err(|e| {
                    CodecError::EncodingError(format!("Failed to write Opus packet: {}", e))
                })?;
        }
    }

    Ok(ogg_data)
}

/// 解码 Ogg Opus 为 48kHz 单声道
///
/// 流被截断或包损坏时返回错误
pub fn decode_ogg_opus(data: &[u8]) -> Result<(Vec<f32>, u32), CodecError> {
    let mut reader = PacketReader::new(Cursor::new(data));

    let head = next_packet(&mut reader)?
        .ok_or_else(|| CodecError::DecodingError("Empty Ogg stream".to_string()))?;
    let header = parse_opus_head(&head.data)?;

    // OpusTags
    next_packet(&mut reader)?
        .ok_or_else(|| CodecError::DecodingError("Missing OpusTags packet".to_string()))?;

    let channels = if header.channels == 1 {
        Channels::Mono
    } else {
        Channels::Stereo
    };
    let channel_count = if header.channels == 1 { 1 } else { 2 };
    let mut decoder = Decoder::new(OPUS_DECODE_RATE, channels)
        .map_err(|e| CodecError::DecodingError(format!("Failed to create Opus decoder: {}", e)))?;

    let mut buffer = vec![0f32; MAX_FRAME_SAMPLES * channel_count];
    let mut samples: Vec<f32> = Vec::new();
    let mut final_granule: Option<u64> = None;
    let mut ended = false;

    while let Some(packet) = next_packet(&mut reader)? {
        let frames = decoder
            .decode_float(&packet.data, &mut buffer, false)
            .map_err(|e| CodecError::DecodingError(format!("Opus decode failed: {}", e)))?;
        samples.extend(downmix_to_mono(
            &buffer[..frames * channel_count],
            channel_count,
        ));
        final_granule = Some(packet.absgp_page());
        if packet.last_in_stream() {
            ended = true;
            break;
        }
    }

    if !ended {
        return Err(CodecError::DecodingError(
            "Ogg stream truncated before end of stream".to_string(),
        ));
    }

    let pre_skip = header.pre_skip as usize;
    if samples.len() <= pre_skip {
        return Err(CodecError::DecodingError(
            "Opus stream contains no audio".to_string(),
        ));
    }
    samples.drain(..pre_skip);

    if let Some(granule) = final_granule {
        let total = (granule as usize).saturating_sub(pre_skip);
        if total > 0 && total < samples.len() {
            samples.truncate(total);
        }
    }

    Ok((samples, OPUS_DECODE_RATE))
}

pub(super) struct OpusHeader {
    pub channels: u8,
    pub pre_skip: u16,
    /// 编码前的原始采样率，0 表示未知
    pub input_rate: u32,
}

pub(super) fn next_packet(
    reader: &mut PacketReader<Cursor<&[u8]>>,
) -> Result<Option<ogg::Packet>, CodecError> {
    reader
        .read_packet()
        .map_err(|e| CodecError::DecodingError(format!("Ogg read error: {}", e)))
}

pub(super) fn parse_opus_head(data: &[u8]) -> Result<OpusHeader, CodecError> {
    if data.len() < 19 || &data[0..8] != b"OpusHead" {
        return Err(CodecError::DecodingError(
            "Ogg stream is not Opus".to_string(),
        ));
    }
    let channels = data[9];
    if channels == 0 || channels > 2 {
        return Err(CodecError::DecodingError(format!(
            "Unsupported Opus channel count: {}",
            channels
        )));
    }
    Ok(OpusHeader {
        channels,
        pre_skip: u16::from_le_bytes([data[10], data[11]]),
        input_rate: u32::from_le_bytes([data[12], data[13], data[14], data[15]]),
    })
}

/// Opus Head 包 (RFC 7845)
fn opus_head(channels: u8, input_rate: u32, pre_skip: u16) -> Vec<u8> {
    let mut head = Vec::with_capacity(19);
    head.extend_from_slice(b"OpusHead"); // Magic signature
    head.push(1); // Version
    head.push(channels);
    head.extend_from_slice(&pre_skip.to_le_bytes());
    head.extend_from_slice(&input_rate.to_le_bytes());
    head.extend_from_slice(&0i16.to_le_bytes()); // Output gain
    head.push(0); // Channel mapping family
    head
}

fn opus_tags() -> Vec<u8> {
    let vendor = env!("CARGO_PKG_NAME");
    let mut tags = Vec::new();
    tags.extend_from_slice(b"OpusTags");
    tags.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    tags.extend_from_slice(vendor.as_bytes());
    tags.extend_from_slice(&0u32.to_le_bytes()); // No user comments
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(seconds: f32, rate: u32) -> Vec<f32> {
        let n = (seconds * rate as f32) as usize;
        (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / rate as f32).sin() * 0.4)
            .collect()
    }

    #[test]
    fn test_opus_round_trip_preserves_duration() {
        let samples = tone(1.0, 16_000);
        let ogg = encode_ogg_opus(&samples, 16_000, 32_000).unwrap();
        assert_eq!(&ogg[0..4], b"OggS");

        let (decoded, rate) = decode_ogg_opus(&ogg).unwrap();
        assert_eq!(rate, 48_000);
        let seconds = decoded.len() as f64 / rate as f64;
        assert!((seconds - 1.0).abs() < 0.03, "decoded {}s", seconds);

        let energy: f32 = decoded.iter().map(|s| s * s).sum::<f32>() / decoded.len() as f32;
        assert!(energy > 0.01);
    }

    #[test]
    fn test_truncated_stream_is_rejected() {
        let ogg = encode_ogg_opus(&tone(1.0, 24_000), 24_000, 32_000).unwrap();
        let truncated = &ogg[..ogg.len() / 2];
        assert!(decode_ogg_opus(truncated).is_err());
    }

    #[test]
    fn test_non_opus_rejected() {
        assert!(decode_ogg_opus(b"not an ogg stream at all").is_err());
        assert!(parse_opus_head(b"OpusHead").is_err());
    }
}

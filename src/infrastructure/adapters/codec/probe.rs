//! 只读容器头，获取采样率与声道数

use std::io::Cursor;

use ogg::reading::PacketReader;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::opus_ogg::{next_packet, parse_opus_head, OPUS_DECODE_RATE};
use crate::domain::speech::AudioFormat;

/// 探测只需要文件开头
const PROBE_PREFIX: usize = 64 * 1024;

/// 音频流参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamParams {
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
}

/// 从容器头读取采样率和声道数，不解码音频
///
/// 头部无法识别时返回空参数
pub fn probe_stream_params(data: &[u8], format: AudioFormat) -> StreamParams {
    let prefix = &data[..data.len().min(PROBE_PREFIX)];
    let params = match format {
        AudioFormat::Opus => probe_opus(prefix),
        _ => probe_symphonia(prefix, format),
    };
    params.unwrap_or_default()
}

fn probe_opus(data: &[u8]) -> Option<StreamParams> {
    let mut reader = PacketReader::new(Cursor::new(data));
    let head = next_packet(&mut reader).ok()??;
    let header = parse_opus_head(&head.data).ok()?;
    let sample_rate = if header.input_rate > 0 {
        header.input_rate
    } else {
        OPUS_DECODE_RATE
    };
    Some(StreamParams {
        sample_rate: Some(sample_rate),
        channels: Some(header.channels as u16),
    })
}

fn probe_symphonia(data: &[u8], format: AudioFormat) -> Option<StreamParams> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(data.to_vec())), Default::default());

    let mut hint = Hint::new();
    hint.with_extension(format.as_str());

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .ok()?;
    let params = &probed.format.default_track()?.codec_params;

    Some(StreamParams {
        sample_rate: params.sample_rate,
        channels: params.channels.map(|c| c.count() as u16),
    })
}

//! 声道混合与重采样
//!
//! 重采样走 rubato 的 FFT 重采样器（带抗混叠滤波），极短输入退回线性插值

use rubato::{FftFixedIn, Resampler};

/// FFT 重采样器每次处理的输入帧数
const RESAMPLE_CHUNK: usize = 1024;

/// 少于此样本数时使用线性插值
const MIN_FFT_INPUT: usize = 64;

/// 交错多声道样本混为单声道（各声道取平均）
pub fn downmix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// 单声道重采样，输出长度为 `round(len * to / from)`
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() || from_rate == 0 || to_rate == 0 {
        return samples.to_vec();
    }

    if samples.len() < MIN_FFT_INPUT {
        return resample_linear(samples, from_rate, to_rate);
    }

    match resample_fft(samples, from_rate, to_rate) {
        Ok(out) => out,
        Err(e) => {
            tracing::warn!(
                from_rate,
                to_rate,
                error = %e,
                "FFT resampling failed, falling back to linear"
            );
            resample_linear(samples, from_rate, to_rate)
        }
    }
}

fn output_len(input_len: usize, from_rate: u32, to_rate: u32) -> usize {
    (input_len as f64 * to_rate as f64 / from_rate as f64).round() as usize
}

fn resample_fft(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, String> {
    let mut resampler =
        FftFixedIn::<f32>::new(from_rate as usize, to_rate as usize, RESAMPLE_CHUNK, 2, 1)
            .map_err(|e| e.to_string())?;

    // 重采样器输出开头有固定延迟，裁掉后才与输入对齐
    let delay = resampler.output_delay();
    let expected = output_len(samples.len(), from_rate, to_rate);

    let mut output = Vec::with_capacity(delay + expected + RESAMPLE_CHUNK);
    let mut input = vec![Vec::with_capacity(RESAMPLE_CHUNK)];
    let mut pos = 0;

    // 输入耗尽后继续喂零，直到延迟之后的样本全部输出
    while output.len() < delay + expected {
        let needed = resampler.input_frames_next();
        let end = (pos + needed).min(samples.len());

        let chunk = &mut input[0];
        chunk.clear();
        chunk.extend_from_slice(&samples[pos..end]);
        chunk.resize(needed, 0.0);

        let resampled = resampler.process(&input, None).map_err(|e| e.to_string())?;
        let produced = resampled.into_iter().next().unwrap_or_default();
        if produced.is_empty() {
            return Err("resampler produced no output".to_string());
        }
        output.extend(produced);
        pos = end;
    }

    Ok(output.into_iter().skip(delay).take(expected).collect())
}

/// 单声道线性插值
fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    let ratio = to_rate as f64 / from_rate as f64;
    let new_len = output_len(samples.len(), from_rate, to_rate);
    let last = samples.len() - 1;

    (0..new_len)
        .map(|i| {
            let src_pos = i as f64 / ratio;
            let idx = (src_pos as usize).min(last);
            let frac = (src_pos - idx as f64) as f32;
            let s0 = samples[idx];
            let s1 = samples[(idx + 1).min(last)];
            s0 + (s1 - s0) * frac
        })
        .collect()
}

/// Opus 编码器支持的采样率: 8000, 12000, 16000, 24000, 48000
pub fn opus_compatible_rate(sample_rate: u32) -> u32 {
    match sample_rate {
        r if r <= 8000 => 8000,
        r if r <= 12000 => 12000,
        r if r <= 16000 => 16000,
        r if r <= 24000 => 24000,
        _ => 48000,
    }
}

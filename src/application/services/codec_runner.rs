//! Codec Runner - 在阻塞线程池上执行编解码
//!
//! `spawn_blocking` 的任务无法中途取消，每个任务都持有一份流水线许可，
//! 客户端断开后许可随任务结束才归还，正在运行的编解码数不超过并发上限

use std::sync::Arc;

use crate::application::error::{GatewayError, Stage};
use crate::application::ports::{AudioCodecPort, DecodedAudio};
use crate::application::services::PermitLease;
use crate::domain::speech::AudioFormat;

pub struct CodecRunner {
    codec: Arc<dyn AudioCodecPort>,
}

impl CodecRunner {
    pub fn new(codec: Arc<dyn AudioCodecPort>) -> Self {
        Self { codec }
    }

    pub fn supports_encoding(&self, format: AudioFormat) -> bool {
        self.codec.supports_encoding(format)
    }

    /// 解码为 16kHz 单声道；空音频或损坏音频返回 DecodeError
    pub async fn decode(
        &self,
        data: Vec<u8>,
        format: AudioFormat,
        lease: PermitLease,
    ) -> Result<DecodedAudio, GatewayError> {
        let codec = self.codec.clone();
        let decoded = tokio::task::spawn_blocking(move || {
            let _lease = lease;
            codec.decode(&data, format)
        })
        .await
        .map_err(|e| GatewayError::internal(format!("decode task failed: {}", e)))?
        .map_err(|e| GatewayError::DecodeError(e.to_string()))?;

        if decoded.is_empty() {
            return Err(GatewayError::DecodeError(
                "audio contains no samples".to_string(),
            ));
        }
        Ok(decoded)
    }

    /// 把合成结果转为调用方请求的格式
    ///
    /// 输入来自合成后端，解码失败视为后端返回了损坏的音频
    pub async fn transcode(
        &self,
        data: Vec<u8>,
        from: AudioFormat,
        to: AudioFormat,
        lease: PermitLease,
    ) -> Result<Vec<u8>, GatewayError> {
        if from == to {
            return Ok(data);
        }

        tracing::debug!(from = %from, to = %to, bytes = data.len(), "Transcoding audio");

        let codec = self.codec.clone();
        tokio::task::spawn_blocking(move || {
            let _lease = lease;
            codec.transcode(data, from, to)
        })
        .await
        .map_err(|e| GatewayError::internal(format!("transcode task failed: {}", e)))?
        .map_err(|e| {
            if e.is_encoding() {
                GatewayError::EncodeError(e.to_string())
            } else {
                GatewayError::BackendError {
                    stage: Stage::Synthesis,
                    status: None,
                    message: format!("malformed audio payload: {}", e),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::CodecError;
    use crate::application::services::ConcurrencyGovernor;
    use crate::application::test_support::{StubCodec, CORRUPT_AUDIO};
    use std::sync::mpsc;
    use std::sync::Mutex;
    use std::time::Duration;

    /// 解码开始时发信号，然后阻塞直到收到放行信号
    struct GatedCodec {
        started: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl AudioCodecPort for GatedCodec {
        fn decode_to(
            &self,
            _data: &[u8],
            _format: AudioFormat,
            target_rate: Option<u32>,
        ) -> Result<DecodedAudio, CodecError> {
            let _ = self.started.lock().unwrap().send(());
            let _ = self.release.lock().unwrap().recv();
            Ok(DecodedAudio::new(vec![0.0; 160], target_rate.unwrap_or(16_000)))
        }

        fn encode(&self, _audio: &DecodedAudio, format: AudioFormat) -> Result<Vec<u8>, CodecError> {
            Err(CodecError::UnsupportedFormat(format.to_string()))
        }

        fn supports_encoding(&self, _format: AudioFormat) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn test_decode_rejects_corrupt_and_empty() {
        let governor = ConcurrencyGovernor::new(1, None);
        let permit = governor.acquire().await.unwrap();
        let runner = CodecRunner::new(Arc::new(StubCodec));

        let err = runner
            .decode(CORRUPT_AUDIO.to_vec(), AudioFormat::Wav, permit.lease())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::DecodeError(_)));

        let err = runner
            .decode(Vec::new(), AudioFormat::Wav, permit.lease())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::DecodeError(_)));

        let audio = runner
            .decode(vec![0u8; 500], AudioFormat::Wav, permit.lease())
            .await
            .unwrap();
        assert!((audio.duration_secs - 0.5).abs() < 1e-9);

        drop(permit);
        assert_eq!(governor.available(), 1);
    }

    #[tokio::test]
    async fn test_transcode_passthrough_and_unsupported() {
        let governor = ConcurrencyGovernor::new(1, None);
        let permit = governor.acquire().await.unwrap();
        let runner = CodecRunner::new(Arc::new(StubCodec));

        let same = runner
            .transcode(b"abc".to_vec(), AudioFormat::Mp3, AudioFormat::Mp3, permit.lease())
            .await
            .unwrap();
        assert_eq!(same, b"abc");

        let err = runner
            .transcode(b"abc".to_vec(), AudioFormat::Wav, AudioFormat::Mp3, permit.lease())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::EncodeError(_)));

        let err = runner
            .transcode(
                CORRUPT_AUDIO.to_vec(),
                AudioFormat::Wav,
                AudioFormat::Opus,
                permit.lease(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::BackendError { .. }));
    }

    #[tokio::test]
    async fn test_cancelled_request_keeps_slot_until_decode_finishes() {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let runner = Arc::new(CodecRunner::new(Arc::new(GatedCodec {
            started: Mutex::new(started_tx),
            release: Mutex::new(release_rx),
        })));
        let governor = ConcurrencyGovernor::new(1, None);

        let permit = governor.acquire().await.unwrap();
        let request = tokio::spawn({
            let runner = runner.clone();
            async move {
                let lease = permit.lease();
                let _permit = permit;
                runner.decode(vec![0u8; 100], AudioFormat::Wav, lease).await
            }
        });

        tokio::task::spawn_blocking(move || started_rx.recv())
            .await
            .unwrap()
            .unwrap();

        // 客户端断开：请求 future 被丢弃，解码仍在阻塞线程上运行
        request.abort();
        assert!(request.await.unwrap_err().is_cancelled());
        assert_eq!(governor.available(), 0);

        release_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), async {
            while governor.available() == 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
        assert_eq!(governor.available(), 1);
    }
}

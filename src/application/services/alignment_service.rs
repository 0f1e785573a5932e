//! Alignment Service - 对齐后端调用
//!
//! 给后端调用套上时间预算，超时后丢弃进行中的请求

use std::sync::Arc;
use std::time::Duration;

use crate::application::error::GatewayError;
use crate::application::ports::{AlignmentEnginePort, AlignmentHints, DecodedAudio};
use crate::domain::alignment::RawAlignmentToken;

pub struct AlignmentService {
    engine: Arc<dyn AlignmentEnginePort>,
    budget: Duration,
}

impl AlignmentService {
    pub fn new(engine: Arc<dyn AlignmentEnginePort>, budget: Duration) -> Self {
        Self { engine, budget }
    }

    pub fn engine(&self) -> &Arc<dyn AlignmentEnginePort> {
        &self.engine
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// 对齐音频，返回按开始时间排序的原始 token
    pub async fn align(
        &self,
        audio: &DecodedAudio,
        hints: &AlignmentHints,
    ) -> Result<Vec<RawAlignmentToken>, GatewayError> {
        tracing::debug!(
            duration_secs = audio.duration_secs,
            sample_rate = audio.sample_rate,
            language = ?hints.language,
            forced = hints.reference_text.is_some(),
            "Requesting alignment"
        );

        let mut tokens = match tokio::time::timeout(self.budget, self.engine.align(audio, hints)).await
        {
            Ok(Ok(tokens)) => tokens,
            Ok(Err(e)) => return Err(GatewayError::from_alignment(e, self.budget)),
            Err(_) => {
                tracing::warn!(
                    budget_secs = self.budget.as_secs_f64(),
                    "Alignment exceeded its time budget"
                );
                return Err(GatewayError::AlignmentTimeout(self.budget));
            }
        };

        if tokens.is_empty() && !audio.is_empty() {
            return Err(GatewayError::AlignmentFailure(
                "backend returned no tokens for non-empty audio".to_string(),
            ));
        }

        // 稳定排序，开始时间相同的 token 保持后端顺序
        tokens.sort_by(|a, b| a.start.total_cmp(&b.start));

        tracing::debug!(tokens = tokens.len(), "Alignment completed");
        Ok(tokens)
    }
}

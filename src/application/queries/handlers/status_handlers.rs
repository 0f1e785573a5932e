//! Status Query Handlers

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::ports::{AlignmentEnginePort, TtsEnginePort};
use crate::application::queries::{GetHealth, GetServiceInfo};
use crate::application::services::{ConcurrencyGovernor, GovernorStats};

/// 服务信息
#[derive(Debug, Clone)]
pub struct ServiceInfoResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub tts_backend: String,
    pub alignment_model: String,
    pub alignment_device: String,
    pub started_at: DateTime<Utc>,
}

/// 健康状态
#[derive(Debug, Clone)]
pub struct HealthResponse {
    pub tts_healthy: bool,
    pub pipeline: GovernorStats,
}

impl HealthResponse {
    pub fn status(&self) -> &'static str {
        if self.tts_healthy {
            "healthy"
        } else {
            "degraded"
        }
    }
}

/// GetServiceInfo Handler
pub struct GetServiceInfoHandler {
    tts: Arc<dyn TtsEnginePort>,
    aligner: Arc<dyn AlignmentEnginePort>,
    started_at: DateTime<Utc>,
}

impl GetServiceInfoHandler {
    pub fn new(
        tts: Arc<dyn TtsEnginePort>,
        aligner: Arc<dyn AlignmentEnginePort>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            tts,
            aligner,
            started_at,
        }
    }

    pub fn handle(&self, _query: GetServiceInfo) -> ServiceInfoResponse {
        ServiceInfoResponse {
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            tts_backend: self.tts.backend_url().to_string(),
            alignment_model: self.aligner.model_name().to_string(),
            alignment_device: self.aligner.device().to_string(),
            started_at: self.started_at,
        }
    }
}

/// GetHealth Handler
pub struct GetHealthHandler {
    tts: Arc<dyn TtsEnginePort>,
    governor: Arc<ConcurrencyGovernor>,
}

impl GetHealthHandler {
    pub fn new(tts: Arc<dyn TtsEnginePort>, governor: Arc<ConcurrencyGovernor>) -> Self {
        Self { tts, governor }
    }

    pub async fn handle(&self, _query: GetHealth) -> HealthResponse {
        HealthResponse {
            tts_healthy: self.tts.health_check().await,
            pipeline: self.governor.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{StubAligner, StubTts};
    use crate::domain::speech::AudioFormat;

    #[tokio::test]
    async fn test_health_reports_pipeline_usage() {
        let governor = Arc::new(ConcurrencyGovernor::new(2, None));
        let handler = GetHealthHandler::new(
            Arc::new(StubTts::returning(b"x", AudioFormat::Wav)),
            governor.clone(),
        );

        let _permit = governor.acquire().await.unwrap();
        let health = handler.handle(GetHealth).await;
        assert_eq!(health.status(), "healthy");
        assert_eq!(health.pipeline.in_flight, 1);
        assert_eq!(health.pipeline.max_concurrent, 2);
    }

    #[test]
    fn test_service_info() {
        let handler = GetServiceInfoHandler::new(
            Arc::new(StubTts::returning(b"x", AudioFormat::Wav)),
            Arc::new(StubAligner::returning(Vec::new())),
            Utc::now(),
        );
        let info = handler.handle(GetServiceInfo);
        assert_eq!(info.service, "voxalign");
        assert_eq!(info.tts_backend, "http://stub-tts");
        assert_eq!(info.alignment_model, "stub");
    }
}

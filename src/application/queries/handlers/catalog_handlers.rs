//! Catalog Query Handlers

use std::sync::Arc;

use crate::application::error::GatewayError;
use crate::application::ports::{PassthroughResponse, TtsEnginePort};
use crate::application::queries::{ListModels, ListVoices, ProxyWeb};
use crate::domain::speech::VoiceTable;

// ============================================================================
// Response DTOs
// ============================================================================

/// 音色信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceResponse {
    pub id: String,
    pub name: String,
    pub language: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// ListVoices Handler
pub struct ListVoicesHandler {
    voices: Arc<VoiceTable>,
}

impl ListVoicesHandler {
    pub fn new(voices: Arc<VoiceTable>) -> Self {
        Self { voices }
    }

    pub fn handle(&self, _query: ListVoices) -> Vec<VoiceResponse> {
        self.voices
            .voices()
            .iter()
            .map(|voice| VoiceResponse {
                id: voice.as_str().to_string(),
                name: voice.name().to_string(),
                language: voice.language().to_string(),
            })
            .collect()
    }
}

/// ListModels Handler - 透传合成后端的 `/v1/models`
pub struct ListModelsHandler {
    engine: Arc<dyn TtsEnginePort>,
}

impl ListModelsHandler {
    pub fn new(engine: Arc<dyn TtsEnginePort>) -> Self {
        Self { engine }
    }

    pub async fn handle(&self, _query: ListModels) -> Result<PassthroughResponse, GatewayError> {
        self.engine
            .passthrough_get("/v1/models")
            .await
            .map_err(GatewayError::from_tts)
    }
}

/// ProxyWeb Handler - 透传合成后端的 `/web/...`
pub struct ProxyWebHandler {
    engine: Arc<dyn TtsEnginePort>,
}

impl ProxyWebHandler {
    pub fn new(engine: Arc<dyn TtsEnginePort>) -> Self {
        Self { engine }
    }

    pub async fn handle(&self, query: ProxyWeb) -> Result<PassthroughResponse, GatewayError> {
        let path = query.path.trim_start_matches('/');
        if path.split('/').any(|segment| segment == "..") {
            return Err(GatewayError::invalid_parameter("invalid web path"));
        }

        self.engine
            .passthrough_get(&format!("/web/{}", path))
            .await
            .map_err(GatewayError::from_tts)
    }
}

//! Application State
//!
//! 启动时组装所有 Command/Query Handlers，之后只读

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::application::{
    // Services
    AlignmentService, CodecRunner, ConcurrencyGovernor, SynthesisClient,
    // Command handlers
    AlignAudioHandler, SpeechWithAlignmentHandler, SynthesizeSpeechHandler,
    // Query handlers
    GetHealthHandler, GetServiceInfoHandler, ListModelsHandler, ListVoicesHandler,
    ProxyWebHandler,
    // Ports
    AlignmentEnginePort, AudioCodecPort, TtsEnginePort,
};
use crate::domain::speech::VoiceTable;

/// 应用状态
pub struct AppState {
    pub governor: Arc<ConcurrencyGovernor>,

    // ========== Command Handlers ==========
    pub synthesize_handler: SynthesizeSpeechHandler,
    pub speech_with_alignment_handler: SpeechWithAlignmentHandler,
    pub align_handler: AlignAudioHandler,

    // ========== Query Handlers ==========
    pub list_voices_handler: ListVoicesHandler,
    pub list_models_handler: ListModelsHandler,
    pub proxy_web_handler: ProxyWebHandler,
    pub service_info_handler: GetServiceInfoHandler,
    pub health_handler: GetHealthHandler,
}

impl AppState {
    /// 创建应用状态
    ///
    /// `alignment_budget` 为单次对齐的时间上限
    pub fn new(
        tts_engine: Arc<dyn TtsEnginePort>,
        alignment_engine: Arc<dyn AlignmentEnginePort>,
        codec: Arc<dyn AudioCodecPort>,
        voices: Arc<VoiceTable>,
        governor: Arc<ConcurrencyGovernor>,
        alignment_budget: Duration,
    ) -> Self {
        let synthesis = Arc::new(SynthesisClient::new(tts_engine.clone(), voices.clone()));
        let alignment = Arc::new(AlignmentService::new(
            alignment_engine.clone(),
            alignment_budget,
        ));
        let codec = Arc::new(CodecRunner::new(codec));

        Self {
            governor: governor.clone(),

            // Command handlers
            synthesize_handler: SynthesizeSpeechHandler::new(
                synthesis.clone(),
                codec.clone(),
                governor.clone(),
            ),
            speech_with_alignment_handler: SpeechWithAlignmentHandler::new(
                synthesis,
                alignment.clone(),
                codec.clone(),
                governor.clone(),
            ),
            align_handler: AlignAudioHandler::new(alignment, codec, governor.clone()),

            // Query handlers
            list_voices_handler: ListVoicesHandler::new(voices),
            list_models_handler: ListModelsHandler::new(tts_engine.clone()),
            proxy_web_handler: ProxyWebHandler::new(tts_engine.clone()),
            service_info_handler: GetServiceInfoHandler::new(
                tts_engine.clone(),
                alignment_engine,
                Utc::now(),
            ),
            health_handler: GetHealthHandler::new(tts_engine, governor),
        }
    }
}

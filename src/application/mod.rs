//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（TtsEngine、AlignmentEngine、AudioCodec）
//! - services: 流水线各阶段（合成、解码、对齐、并发控制）
//! - commands: 占用流水线许可的命令及处理器
//! - queries: 只读查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports
pub use commands::{
    AlignAudioCommand,
    AlignAudioResponse,
    SpeechWithAlignmentCommand,
    SpeechWithAlignmentResponse,
    SynthesizeSpeechCommand,
    SynthesizeSpeechResponse,
    MIN_AUDIO_BYTES,
    // Handlers
    handlers::{AlignAudioHandler, SpeechWithAlignmentHandler, SynthesizeSpeechHandler},
};

pub use error::{GatewayError, Stage};

pub use ports::{
    AlignmentEnginePort,
    AlignmentError,
    AlignmentHints,
    AudioCodecPort,
    CodecError,
    DecodedAudio,
    PassthroughResponse,
    SynthesisResult,
    TtsEnginePort,
    TtsError,
};

pub use queries::{
    GetHealth,
    GetServiceInfo,
    ListModels,
    ListVoices,
    ProxyWeb,
    // Handlers
    handlers::{
        GetHealthHandler, GetServiceInfoHandler, HealthResponse, ListModelsHandler,
        ListVoicesHandler, ProxyWebHandler, ServiceInfoResponse, VoiceResponse,
    },
};

pub use services::{
    AlignmentService, CodecRunner, ConcurrencyGovernor, GovernorStats, PermitLease, PipelinePermit,
    SpeechParams, SynthesisClient,
};

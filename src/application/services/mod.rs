//! 应用服务
//!
//! 流水线的各个阶段，由命令处理器组合使用

mod alignment_service;
mod codec_runner;
mod concurrency_governor;
mod synthesis_client;

pub use alignment_service::AlignmentService;
pub use codec_runner::CodecRunner;
pub use concurrency_governor::{ConcurrencyGovernor, GovernorStats, PermitLease, PipelinePermit};
pub use synthesis_client::{SpeechParams, SynthesisClient};

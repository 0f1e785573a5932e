//! voxalign - 带单词时间戳的 TTS 网关
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Speech Context: 合成参数校验、音色表
//! - Alignment Context: 单词时间戳合成（compose）
//!
//! 应用层 (application/):
//! - Ports: TtsEngine、AlignmentEngine、AudioCodec
//! - Services: 合成、对齐、编解码、流水线并发控制
//! - Commands / Queries: 用例处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: OpenAI 兼容 REST API
//! - Adapters: HTTP/Fake 合成与对齐客户端、Symphonia 编解码

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};

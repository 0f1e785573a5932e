//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Speech Context: 合成参数校验、音色解析
//! - Alignment Context: 单词时间戳合成

pub mod alignment;
pub mod speech;

mod language;

pub use language::{detect_language, language_hint};

//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod alignment;
pub mod codec;
pub mod tts;

pub use alignment::*;
pub use codec::*;
pub use tts::*;

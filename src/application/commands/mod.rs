//! 应用层 - 命令
//!
//! 每个命令对应一次完整的流水线执行

mod alignment_commands;
mod speech_commands;

pub mod handlers;

pub use alignment_commands::*;
pub use speech_commands::*;

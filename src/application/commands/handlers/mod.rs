//! Command Handlers 实现

mod alignment_handlers;
mod speech_handlers;

pub use alignment_handlers::*;
pub use speech_handlers::*;

//! Alignment Adapter - 对齐后端实现

mod fake_alignment_engine;
mod http_alignment_client;

pub use fake_alignment_engine::FakeAlignmentEngine;
pub use http_alignment_client::{HttpAlignmentClient, HttpAlignmentClientConfig};

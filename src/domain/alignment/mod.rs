//! Alignment Context - 单词级时间戳对齐

mod compositor;
mod normalize;
mod word_timing;

pub use compositor::{compose, compose_with_window, words_from_tokens, RESYNC_WINDOW};
pub use normalize::normalize_key;
pub use word_timing::{is_well_ordered, round_millis, RawAlignmentToken, WordTiming};

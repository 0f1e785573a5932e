//! Speech Context - Errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    #[error("Voice not found: {0}")]
    InvalidVoice(String),

    #[error("{0}")]
    InvalidParameter(String),
}

impl SpeechError {
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }
}

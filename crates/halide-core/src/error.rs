use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The source bytes could not be decoded into pixels.
    #[error("decode error: {0}")]
    Decode(String),
    #[error("invalid pixel buffer: {0}")]
    InvalidBuffer(String),
    #[error("encode error: {0}")]
    Encode(String),
}

impl PipelineError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn invalid_buffer(msg: impl Into<String>) -> Self {
        Self::InvalidBuffer(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

use thiserror::Error;

pub type SurfaceResult<T> = Result<T, SurfaceError>;

#[derive(Debug, Error)]
pub enum SurfaceError {
    /// No canvas could be allocated for the requested size.
    #[error("drawing surface unavailable: {0}")]
    Unavailable(String),
    #[error("export failed: {0}")]
    Encode(String),
    #[error("font error: {0}")]
    Font(String),
}

impl SurfaceError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }
}

/// Crate-wide result alias.
pub type LottieResult<T> = Result<T, LottieError>;

/// Errors surfaced by loading and rendering.
#[derive(thiserror::Error, Debug)]
pub enum LottieError {
    /// The document is not valid JSON or misses required structure.
    #[error("parse error: {0}")]
    Parse(String),

    /// Reading an animation or resource failed.
    #[error("io error: {0}")]
    Io(String),

    /// A caller-supplied argument is out of range.
    #[error("validation error: {0}")]
    Validation(String),

    /// An asynchronous render is already outstanding for this animation.
    #[error("render rejected: a render request is already in flight")]
    RenderBusy,

    /// The render pipeline failed (worker gone, channel closed).
    #[error("render error: {0}")]
    Render(String),

    /// Any other failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LottieError {
    /// Build a [`LottieError::Parse`].
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`LottieError::Io`].
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Build a [`LottieError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LottieError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

impl From<serde_json::Error> for LottieError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<std::io::Error> for LottieError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

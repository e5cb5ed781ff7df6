/// Convenience result type used across loopfx.
pub type LoopResult<T> = Result<T, LoopError>;

/// Top-level error taxonomy.
///
/// Errors only surface at construction and configuration boundaries. The per-frame path
/// (`update`, `draw`, `tick`) never fails.
#[derive(thiserror::Error, Debug)]
pub enum LoopError {
    /// Invalid schedule, layout or geometry parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// Drawing surface could not be allocated or resized.
    #[error("surface error: {0}")]
    Surface(String),

    /// Invalid effect or host configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LoopError {
    /// Build a [`LoopError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LoopError::Surface`] value.
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    /// Build a [`LoopError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`LoopError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for LoopError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

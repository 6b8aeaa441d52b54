/// Convenience result type used across code-playback.
pub type PlaybackResult<T> = Result<T, PlaybackError>;

/// Top-level error taxonomy.
///
/// Every failure is scoped to the action that triggered it; nothing here is fatal to the process.
#[derive(thiserror::Error, Debug)]
pub enum PlaybackError {
    /// Missing or malformed user input (repository identifier, path, rate, empty source).
    #[error("input error: {0}")]
    Input(String),

    /// A path or file that does not exist in the selected backend.
    #[error("not found: {0}")]
    NotFound(String),

    /// A required capability of the environment is absent (for example `ffmpeg`).
    #[error("unsupported environment: {0}")]
    Unsupported(String),

    /// Rasterizing or encoding a captured frame failed.
    #[error("capture error: {0}")]
    Capture(String),

    /// Opening, feeding or finalizing the video encoder failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlaybackError {
    /// Build a [`PlaybackError::Input`] value.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Build a [`PlaybackError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`PlaybackError::Unsupported`] value.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Build a [`PlaybackError::Capture`] value.
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Build a [`PlaybackError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`PlaybackError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for errors the shell should show next to its input controls.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::Input(_) | Self::NotFound(_) | Self::Unsupported(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

// Error handling for the video player

use thiserror::Error;

/// Video player error types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlayerError {
    /// Format hint not recognized, or the URI cannot be mapped to a source type.
    /// Raised at construction, before any engine resources are touched.
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Engine-reported playback failure
    #[error("Playback error: {0}")]
    Playback(String),

    /// Operation not valid in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Session was already disposed
    #[error("Player session has been disposed")]
    Disposed,

    /// Rendering surface allocation or release failed
    #[error("Surface error: {0}")]
    Surface(String),

    /// Picture-in-picture host call failed
    #[error("Picture-in-picture error: {0}")]
    PictureInPicture(String),

    /// One or more teardown steps failed
    #[error("Release error: {0}")]
    Release(String),
}

impl PlayerError {
    /// Stable code used when the error is surfaced to a listener
    pub fn code(&self) -> &'static str {
        match self {
            PlayerError::UnsupportedMediaType(_) => "UnsupportedMediaType",
            PlayerError::Playback(_) => "VideoError",
            PlayerError::InvalidState(_) => "InvalidState",
            PlayerError::Disposed => "Disposed",
            PlayerError::Surface(_) => "SurfaceError",
            PlayerError::PictureInPicture(_) => "PictureInPictureError",
            PlayerError::Release(_) => "ReleaseError",
        }
    }
}

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, PlayerError>;

//! Caption Studio Error Definitions
//!
//! Defines error types used throughout the engine.

use thiserror::Error;

use super::{EntityId, TimeSec};

/// Core engine error types
#[derive(Error, Debug)]
pub enum StudioError {
    // =========================================================================
    // Auth & Credit Errors
    // =========================================================================
    #[error("Sign in required to perform this action")]
    AuthRequired,

    #[error("No export credits remaining")]
    InsufficientCredits,

    // =========================================================================
    // Upload & Generation Errors
    // =========================================================================
    #[error("File is too large ({size_mb:.1} MB); the limit is {limit_mb} MB")]
    UploadTooLarge { size_mb: f64, limit_mb: u64 },

    #[error("Transcription failed: {0}")]
    TranscriptionError(String),

    #[error("Translation failed: {0}")]
    TranslationError(String),

    #[error("Caption generation already in progress")]
    GenerationInProgress,

    #[error("Render failed: {0}")]
    RenderError(String),

    // =========================================================================
    // Editing Errors
    // =========================================================================
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("Invalid edit operation: {0}")]
    InvalidEditOperation(String),

    #[error("Invalid time range: {0}~{1} seconds")]
    InvalidTimeRange(TimeSec, TimeSec),

    #[error("Caption overlap: another speech caption occupies {start:.3}~{end:.3}s")]
    CaptionOverlap { start: TimeSec, end: TimeSec },

    #[error("Text box limit reached ({0} maximum)")]
    TextOverlayLimit(usize),

    // =========================================================================
    // History Errors
    // =========================================================================
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    // =========================================================================
    // Session Errors
    // =========================================================================
    #[error("Session file not found: {0}")]
    SessionNotFound(String),

    #[error("Session file corrupted: {0}")]
    SessionCorrupted(String),

    #[error("Waveform extraction failed: {0}")]
    WaveformError(String),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("Service unreachable: {0}")]
    ServiceUnreachable(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Core engine result type
pub type StudioResult<T> = Result<T, StudioError>;

impl StudioError {
    /// True for failures the UI surfaces as a non-fatal notification rather
    /// than an error screen.
    pub fn is_user_recoverable(&self) -> bool {
        !matches!(self, Self::Internal(_) | Self::SessionCorrupted(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_too_large_message_is_human_readable() {
        let err = StudioError::UploadTooLarge {
            size_mb: 31.46,
            limit_mb: 25,
        };
        let msg = err.to_string();
        assert!(msg.contains("31.5 MB"));
        assert!(msg.contains("25 MB"));
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(StudioError::InsufficientCredits.is_user_recoverable());
        assert!(StudioError::RenderError("boom".into()).is_user_recoverable());
        assert!(!StudioError::Internal("bug".into()).is_user_recoverable());
    }
}

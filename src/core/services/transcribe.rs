//! Transcription Service Contract
//!
//! Time-stamped speech-to-text over an uploaded media file. The upload size
//! gate runs client-side, before any network call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{StudioError, StudioResult, TimeSec};

/// Maximum accepted media upload: 25 MB
pub const MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

// =============================================================================
// Media Input
// =============================================================================

/// An audio or video file handed to the transcription service
#[derive(Clone, Debug)]
pub struct MediaInput {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl MediaInput {
    pub fn new(file_name: &str, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            data,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    /// Rejects oversized uploads with a human-readable message before any
    /// network traffic happens.
    pub fn validate_size(&self) -> StudioResult<()> {
        let size = self.size_bytes();
        if size > MAX_UPLOAD_BYTES {
            return Err(StudioError::UploadTooLarge {
                size_mb: size as f64 / (1024.0 * 1024.0),
                limit_mb: MAX_UPLOAD_BYTES / (1024 * 1024),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Transcript
// =============================================================================

/// One time-stamped segment of transcribed speech
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSegment {
    pub start: TimeSec,
    pub end: TimeSec,
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start: TimeSec, end: TimeSec, text: &str) -> Self {
        Self {
            start,
            end,
            text: text.to_string(),
        }
    }
}

/// The full transcription result
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub segments: Vec<TranscriptSegment>,
    pub raw_text: String,
    /// Detected or requested language code
    pub language: String,
}

/// Turns media into time-stamped caption text.
///
/// Fails with [`StudioError::TranscriptionError`] on an unreachable service
/// or an upstream API error; oversized input never reaches the service.
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    async fn transcribe(&self, media: &MediaInput, language: &str) -> StudioResult<Transcript>;
}

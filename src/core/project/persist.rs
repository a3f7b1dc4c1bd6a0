//! Session Persistence
//!
//! Mirrors the editor session to a versioned JSON file on every change and
//! restores it on reload. Durable storage is an external collaborator: the
//! engine writes the whole state, never deltas.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{
    captions::{CaptionEntity, CaptionStyle},
    StudioError, StudioResult, TimeSec,
};

use super::session::{EditorSession, SessionMeta};

/// Format version for migrations
const SNAPSHOT_VERSION: &str = "1.0.0";

// =============================================================================
// Snapshot Data
// =============================================================================

/// Serialized form of an editor session
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub version: String,
    /// Timestamp when the snapshot was written (ISO 8601)
    pub saved_at: String,
    pub meta: SessionMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub duration: TimeSec,
    pub captions: Vec<CaptionEntity>,
    pub caption_style: CaptionStyle,
}

impl SessionSnapshot {
    /// Captures the persistable state of a session
    pub fn capture(session: &EditorSession) -> Self {
        Self {
            version: SNAPSHOT_VERSION.to_string(),
            saved_at: chrono::Utc::now().to_rfc3339(),
            meta: session.meta().clone(),
            video_url: session.video_url().map(|s| s.to_string()),
            duration: session.duration(),
            captions: session.store().entities().to_vec(),
            caption_style: session.style().clone(),
        }
    }

    /// Writes the snapshot to a file, creating parent directories as needed
    pub fn save(&self, path: &Path) -> StudioResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Loads a snapshot from a file
    pub fn load(path: &Path) -> StudioResult<Self> {
        if !path.exists() {
            return Err(StudioError::SessionNotFound(
                path.to_string_lossy().to_string(),
            ));
        }
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| StudioError::SessionCorrupted(e.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Caption Studio Core Type Definitions
//!
//! Defines fundamental types used throughout the engine.

use serde::{Deserialize, Serialize};
use tracing::warn;

// =============================================================================
// ID Types
// =============================================================================

/// Caption/text entity unique identifier (ULID)
pub type EntityId = String;

/// Generates a new unique entity identifier.
pub fn new_entity_id() -> EntityId {
    ulid::Ulid::new().to_string()
}

// =============================================================================
// Time Types
// =============================================================================

/// Time in seconds (floating point)
pub type TimeSec = f64;

/// Time range on the timeline
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start_sec: TimeSec,
    pub end_sec: TimeSec,
}

impl TimeRange {
    /// Creates a new range, swapping the endpoints when they arrive inverted.
    pub fn new(start_sec: TimeSec, end_sec: TimeSec) -> Self {
        if start_sec > end_sec {
            warn!(
                "TimeRange created with start > end ({} > {}), swapping",
                start_sec, end_sec
            );
            return Self {
                start_sec: end_sec,
                end_sec: start_sec,
            };
        }
        Self { start_sec, end_sec }
    }

    /// Returns duration in seconds
    pub fn duration(&self) -> TimeSec {
        self.end_sec - self.start_sec
    }

    /// Checks if a given time is within range (inclusive at both ends)
    pub fn contains(&self, time: TimeSec) -> bool {
        time >= self.start_sec && time <= self.end_sec
    }

    /// Checks if two ranges overlap
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start_sec < other.end_sec && self.end_sec > other.start_sec
    }
}

// =============================================================================
// Spatial Types
// =============================================================================

/// Pixel offset applied to a single word relative to its layout slot
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelOffset {
    pub x: f64,
    pub y: f64,
}

impl PixelOffset {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Canvas size in pixels (the video frame the overlay is rendered onto)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        // 9:16 preview frame
        Self::new(405.0, 720.0)
    }
}

// =============================================================================
// Color Helpers
// =============================================================================

/// Validates a `#RRGGBB` hex color string, falling back to the given default.
///
/// Styles store colors as hex strings end to end; this is the only place a
/// malformed value is caught.
pub fn normalize_hex_color(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    let valid = digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        format!("#{}", digits.to_ascii_lowercase())
    } else {
        warn!("Invalid hex color '{}', using '{}'", value, fallback);
        fallback.to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Caption Entity Models
//!
//! Defines the timed entities the editor manipulates: speech captions and
//! free-floating text overlays, plus the per-word style override record.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::{new_entity_id, EntityId, PixelOffset, TimeRange, TimeSec};

// =============================================================================
// Text Alignment
// =============================================================================

/// Horizontal alignment of caption text
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextAlignment {
    Left,
    #[default]
    Center,
    Right,
}

// =============================================================================
// Word Style Overrides
// =============================================================================

/// Per-word style override.
///
/// Stored in [`CaptionEntity::word_styles`] keyed by `"{entity_id}-{word_index}"`.
/// Every field is optional; an absent field falls through to the global
/// [`super::CaptionStyle`]. Keys are validated against the current word count
/// at read time, never at mutation time — a caption whose text was shortened
/// keeps its stale keys and they are simply never rendered.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_gradient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_gradient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Font size in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_padding: Option<f32>,
    /// Pixel offset from the word's layout slot, set by dragging the word
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<String>,
}

impl WordStyle {
    /// Returns the drag offset of this word.
    pub fn offset(&self) -> PixelOffset {
        PixelOffset::new(self.x, self.y)
    }

    pub fn set_offset(&mut self, offset: PixelOffset) {
        self.x = offset.x;
        self.y = offset.y;
    }
}

// =============================================================================
// Text Box Styling
// =============================================================================

/// Kind of text overlay created from the text tab
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextBoxKind {
    #[default]
    TextBox,
    Heading,
    Subheading,
    Body,
}

impl TextBoxKind {
    /// Default placeholder text for a fresh overlay
    pub fn default_text(&self) -> &'static str {
        match self {
            Self::Heading => "Heading",
            Self::Subheading => "Subheading",
            Self::Body => "Body text",
            Self::TextBox => "Text Box",
        }
    }

    /// Default font size in pixels
    pub fn default_font_size(&self) -> f64 {
        match self {
            Self::Heading => 32.0,
            Self::Subheading => 24.0,
            Self::Body => 14.0,
            Self::TextBox => 18.0,
        }
    }
}

/// Independent screen styling for a text overlay.
///
/// Unlike speech captions, overlays do not share the global render anchor:
/// each one carries its own position, width, and typography.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBoxStyle {
    /// Vertical position as a percentage of the frame height
    pub top: f64,
    /// Horizontal position as a percentage of the frame width
    pub left: f64,
    /// Box width in pixels
    pub width: f64,
    /// Font size in pixels
    pub font_size: f64,
    pub background_color: String,
    pub background_opacity: f32,
    pub color: String,
    pub border_radius: f32,
    pub padding: f32,
    pub text_align: TextAlignment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_transform: Option<String>,
    pub z_index: i32,
}

impl Default for TextBoxStyle {
    fn default() -> Self {
        Self {
            top: 50.0,
            left: 50.0,
            width: 300.0,
            font_size: 18.0,
            background_color: "#000000".to_string(),
            background_opacity: 0.6,
            color: "#ffffff".to_string(),
            border_radius: 12.0,
            padding: 8.0,
            text_align: TextAlignment::Center,
            font_family: None,
            font_weight: None,
            font_style: None,
            text_transform: None,
            z_index: 50,
        }
    }
}

impl TextBoxStyle {
    /// Creates the default styling for a given overlay kind
    pub fn for_kind(kind: TextBoxKind) -> Self {
        Self {
            font_size: kind.default_font_size(),
            font_weight: matches!(kind, TextBoxKind::Heading).then(|| "bold".to_string()),
            ..Default::default()
        }
    }
}

// =============================================================================
// Caption Entity
// =============================================================================

/// A single timed entity: either a speech caption or a text overlay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionEntity {
    /// Unique identifier, stable across mutations
    pub id: EntityId,
    /// Caption text (may contain line breaks)
    pub text: String,
    /// Start time in seconds
    pub start_time: TimeSec,
    /// End time in seconds
    pub end_time: TimeSec,
    /// True for free-floating text overlays, false for speech captions
    #[serde(default)]
    pub is_text_element: bool,
    /// Named animation applied to the whole entity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<String>,
    /// Per-word style overrides keyed `"{entity_id}-{word_index}"`
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub word_styles: HashMap<String, WordStyle>,
    /// Independent position/styling (text overlays only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_style: Option<TextBoxStyle>,
    /// Transient reorder marker set while a speech caption is mid-drag.
    /// Stripped at gesture end when ordering is restored.
    #[serde(skip)]
    pub needs_reorder: bool,
}

impl CaptionEntity {
    /// Creates a speech caption with the given id and timing
    pub fn new(id: &str, start_time: TimeSec, end_time: TimeSec, text: &str) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            start_time,
            end_time,
            is_text_element: false,
            animation: None,
            word_styles: HashMap::new(),
            custom_style: None,
            needs_reorder: false,
        }
    }

    /// Creates a speech caption with an auto-generated ID
    pub fn create(start_time: TimeSec, end_time: TimeSec, text: &str) -> Self {
        Self::new(&new_entity_id(), start_time, end_time, text)
    }

    /// Creates a text overlay of the given kind
    pub fn create_text_box(kind: TextBoxKind, start_time: TimeSec, end_time: TimeSec) -> Self {
        Self {
            id: new_entity_id(),
            text: kind.default_text().to_string(),
            start_time,
            end_time,
            is_text_element: true,
            animation: None,
            word_styles: HashMap::new(),
            custom_style: Some(TextBoxStyle::for_kind(kind)),
            needs_reorder: false,
        }
    }

    /// Returns the duration of this entity in seconds
    pub fn duration(&self) -> TimeSec {
        self.end_time - self.start_time
    }

    /// Returns true if the entity is live at the given playback time.
    /// Both endpoints are inclusive: a caption ending at 5.0 is still
    /// rendered at exactly 5.0.
    pub fn is_visible_at(&self, time: TimeSec) -> bool {
        time >= self.start_time && time <= self.end_time
    }

    /// The entity's `[start_time, end_time]` window
    pub fn time_range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }

    /// Returns true if this entity's time range overlaps another's
    pub fn overlaps(&self, other: &CaptionEntity) -> bool {
        self.time_range().overlaps(&other.time_range())
    }

    /// The entity's words, split on whitespace. Word indices used by
    /// `word_styles` keys refer to positions in this list.
    pub fn words(&self) -> Vec<&str> {
        self.text.split_whitespace().collect()
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Builds the `word_styles` key for a word index on this entity
    pub fn word_style_key(&self, word_index: usize) -> String {
        format!("{}-{}", self.id, word_index)
    }

    /// Returns the style override for a word, validated against the current
    /// text. A key referencing an index past the end of the word list is a
    /// stale leftover and reads as `None`.
    pub fn word_style(&self, word_index: usize) -> Option<&WordStyle> {
        if word_index >= self.word_count() {
            return None;
        }
        self.word_styles.get(&self.word_style_key(word_index))
    }

    /// Returns a mutable override record for a word, creating it on demand.
    /// Fails the index bound silently with `None`; callers treat that as a
    /// no-op.
    pub fn word_style_mut(&mut self, word_index: usize) -> Option<&mut WordStyle> {
        if word_index >= self.word_count() {
            return None;
        }
        let key = self.word_style_key(word_index);
        Some(self.word_styles.entry(key).or_default())
    }

    /// Sets the whole-entity animation
    pub fn with_animation(mut self, animation: &str) -> Self {
        self.animation = Some(animation.to_string());
        self
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Global Caption Style
//!
//! The shared style applied to every speech caption. Word-level overrides
//! ([`super::WordStyle`]) and text-overlay styles ([`super::TextBoxStyle`])
//! layer on top of this.

use serde::{Deserialize, Serialize};

use super::TextAlignment;

// =============================================================================
// Enumerations
// =============================================================================

/// Text case transform applied at render time
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextCase {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

/// Vertical anchor of the caption box.
///
/// Purely cosmetic: it decides which direction the box grows when the text
/// wraps, and must never feed back into the stored `position_y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Top,
    #[default]
    Center,
    Bottom,
}

// =============================================================================
// Caption Style
// =============================================================================

/// Global caption text style shared by all speech captions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionStyle {
    /// Font family name
    pub font_family: String,
    /// Font size in pixels
    pub font_size: f64,
    /// CSS-style font weight ("400", "500", "bold", ...)
    pub font_weight: String,
    pub font_style: String,
    /// Line height multiplier
    pub line_spacing: f64,
    /// Letter spacing in pixels
    pub letter_spacing: f64,
    /// Word spacing in pixels
    pub word_spacing: f64,
    pub text_case: TextCase,
    pub text_align: TextAlignment,
    /// Text color as a hex string
    pub text_color: String,
    /// CSS gradient applied to the text (overrides `text_color` when set)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_gradient: Option<String>,
    pub text_opacity: f32,
    /// Background color behind the word currently emphasized
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_gradient: Option<String>,
    pub has_background: bool,
    pub background_opacity: f32,
    /// Background padding in pixels
    pub background_padding: f32,
    pub has_stroke: bool,
    pub has_shadow: bool,
    pub anchor: Anchor,
    /// Horizontal position as a percentage of the frame width
    pub position_x: f64,
    /// Vertical position as a percentage of the frame height
    pub position_y: f64,
    pub scale: f64,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_family: "Inter".to_string(),
            font_size: 18.0,
            font_weight: "500".to_string(),
            font_style: "normal".to_string(),
            line_spacing: 1.4,
            letter_spacing: 0.0,
            word_spacing: 1.0,
            text_case: TextCase::None,
            text_align: TextAlignment::Center,
            text_color: "#ffffff".to_string(),
            text_gradient: None,
            text_opacity: 1.0,
            highlight_color: None,
            highlight_gradient: None,
            has_background: true,
            background_opacity: 0.7,
            background_padding: 8.0,
            has_stroke: false,
            has_shadow: false,
            anchor: Anchor::Center,
            position_x: 50.0,
            position_y: 75.0,
            scale: 1.0,
        }
    }
}

impl CaptionStyle {
    /// Bare white text, no background
    pub fn minimal() -> Self {
        Self {
            has_background: false,
            has_shadow: false,
            ..Default::default()
        }
    }

    /// Heavy uppercase style with a highlight sweep, for hook lines
    pub fn bold_pop() -> Self {
        Self {
            font_family: "Anton".to_string(),
            font_size: 24.0,
            font_weight: "bold".to_string(),
            text_case: TextCase::Uppercase,
            has_background: false,
            has_shadow: true,
            highlight_color: Some("#facc15".to_string()),
            ..Default::default()
        }
    }

    /// Word-by-word karaoke emphasis on a dim background
    pub fn karaoke() -> Self {
        Self {
            highlight_color: Some("#a855f7".to_string()),
            background_opacity: 0.5,
            ..Default::default()
        }
    }
}

// =============================================================================
// Style Templates
// =============================================================================

/// A named preset the user applies wholesale
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleTemplate {
    pub name: String,
    pub style: CaptionStyle,
}

impl StyleTemplate {
    /// The built-in template catalog
    pub fn builtin() -> Vec<StyleTemplate> {
        vec![
            StyleTemplate {
                name: "Clean".to_string(),
                style: CaptionStyle::minimal(),
            },
            StyleTemplate {
                name: "Bold Pop".to_string(),
                style: CaptionStyle::bold_pop(),
            },
            StyleTemplate {
                name: "Karaoke".to_string(),
                style: CaptionStyle::karaoke(),
            },
            StyleTemplate {
                name: "Classic".to_string(),
                style: CaptionStyle::default(),
            },
        ]
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Word-Level Overlay Editor
//!
//! Direct manipulation of the caption layer rendered over the video frame:
//! dragging a single word moves only that word's pixel offset; dragging a
//! caption block moves the global render anchor shared by every
//! simultaneously visible speech caption; dragging a text overlay moves its
//! own independent position; resizing scales font size proportionally to
//! the width change.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{
    captions::{CaptionStore, CaptionStyle, WordStyle},
    CanvasSize, EntityId, StudioError, StudioResult,
};

/// Caption container width limits, pixels
pub const MIN_CONTAINER_WIDTH: f64 = 150.0;
pub const MAX_CONTAINER_WIDTH: f64 = 600.0;

/// Font size limits under proportional resize, pixels
pub const MIN_FONT_SIZE: f64 = 12.0;
pub const MAX_FONT_SIZE: f64 = 60.0;

/// Screen-position limits for draggable anchors, percent
pub const MIN_POSITION_PERCENT: f64 = 5.0;
pub const MAX_POSITION_PERCENT: f64 = 95.0;

/// A word drag shorter than this is treated as a click, pixels
pub const WORD_DRAG_DEADZONE_PX: f64 = 2.0;

// =============================================================================
// Word Selection
// =============================================================================

/// A clicked word, scoping the word-style popup to one
/// `(entity, word_index)` pair
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordSelection {
    pub entity_id: EntityId,
    pub word_index: usize,
    pub word: String,
}

// =============================================================================
// Gesture State
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
enum OverlayGesture {
    /// Dragging a speech-caption block: moves the shared global anchor
    DragAnchor {
        start_x: f64,
        start_y: f64,
        initial_x_percent: f64,
        initial_y_percent: f64,
    },
    /// Dragging a single word's pixel offset
    DragWord {
        entity_id: EntityId,
        word_index: usize,
        start_x: f64,
        start_y: f64,
        initial_x: f64,
        initial_y: f64,
    },
    /// Dragging a text overlay's own position
    DragTextBox {
        entity_id: EntityId,
        start_x: f64,
        start_y: f64,
        initial_top: f64,
        initial_left: f64,
    },
    /// Resizing the shared caption container
    ResizeContainer {
        start_x: f64,
        initial_width: f64,
        initial_font_size: f64,
    },
    /// Resizing a text overlay's box
    ResizeTextBox {
        entity_id: EntityId,
        start_x: f64,
        initial_width: f64,
        initial_font_size: f64,
    },
}

// =============================================================================
// Editor
// =============================================================================

/// Owns the active canvas gesture and the shared caption container width
#[derive(Clone, Debug)]
pub struct OverlayEditor {
    canvas: CanvasSize,
    gesture: Option<OverlayGesture>,
    /// Width of the shared caption container, pixels
    container_width: f64,
}

impl Default for OverlayEditor {
    fn default() -> Self {
        Self::new(CanvasSize::default())
    }
}

impl OverlayEditor {
    pub fn new(canvas: CanvasSize) -> Self {
        Self {
            canvas,
            gesture: None,
            container_width: 300.0,
        }
    }

    pub fn set_canvas(&mut self, canvas: CanvasSize) {
        self.canvas = canvas;
    }

    pub fn container_width(&self) -> f64 {
        self.container_width
    }

    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    // =========================================================================
    // Word Interaction
    // =========================================================================

    /// Resolves a click on a rendered word. Returns `None` for an empty
    /// entity or an out-of-range index — stale indices read as nothing, not
    /// as an error.
    pub fn word_click(
        &self,
        store: &CaptionStore,
        entity_id: &str,
        word_index: usize,
    ) -> Option<WordSelection> {
        let entity = store.get(entity_id)?;
        let word = entity.words().get(word_index).copied()?;
        Some(WordSelection {
            entity_id: entity.id.clone(),
            word_index,
            word: word.to_string(),
        })
    }

    /// Applies a style change to one word, creating the override record on
    /// demand. Out-of-range indices are rejected; stale stored keys are the
    /// renderer's problem and stay untouched.
    pub fn update_word_style(
        store: &mut CaptionStore,
        entity_id: &str,
        word_index: usize,
        apply: impl FnOnce(&mut WordStyle),
    ) -> StudioResult<()> {
        let entity = store
            .get_mut(entity_id)
            .ok_or_else(|| StudioError::EntityNotFound(entity_id.to_string()))?;
        let style = entity.word_style_mut(word_index).ok_or_else(|| {
            StudioError::InvalidEditOperation(format!(
                "Word index {} out of range for entity {}",
                word_index, entity_id
            ))
        })?;
        apply(style);
        Ok(())
    }

    /// Starts dragging a word. Returns false (and starts nothing) when the
    /// entity has no such word; an empty caption accepts no word
    /// interactions.
    pub fn begin_word_drag(
        &mut self,
        store: &CaptionStore,
        entity_id: &str,
        word_index: usize,
        pointer_x: f64,
        pointer_y: f64,
    ) -> bool {
        let Some(entity) = store.get(entity_id) else {
            return false;
        };
        if word_index >= entity.word_count() {
            return false;
        }
        let offset = entity
            .word_style(word_index)
            .map(|s| s.offset())
            .unwrap_or_default();
        debug!(entity_id, word_index, "Begin word drag");
        self.gesture = Some(OverlayGesture::DragWord {
            entity_id: entity_id.to_string(),
            word_index,
            start_x: pointer_x,
            start_y: pointer_y,
            initial_x: offset.x,
            initial_y: offset.y,
        });
        true
    }

    // =========================================================================
    // Block / Container Gestures
    // =========================================================================

    /// Starts dragging the shared speech-caption anchor. All simultaneously
    /// visible speech captions follow this one anchor; text overlays do not.
    pub fn begin_anchor_drag(&mut self, style: &CaptionStyle, pointer_x: f64, pointer_y: f64) {
        self.gesture = Some(OverlayGesture::DragAnchor {
            start_x: pointer_x,
            start_y: pointer_y,
            initial_x_percent: style.position_x,
            initial_y_percent: style.position_y,
        });
    }

    /// Starts dragging a text overlay's independent position
    pub fn begin_text_box_drag(
        &mut self,
        store: &CaptionStore,
        entity_id: &str,
        pointer_x: f64,
        pointer_y: f64,
    ) -> StudioResult<()> {
        let entity = store
            .get(entity_id)
            .ok_or_else(|| StudioError::EntityNotFound(entity_id.to_string()))?;
        let style = entity.custom_style.clone().unwrap_or_default();
        self.gesture = Some(OverlayGesture::DragTextBox {
            entity_id: entity_id.to_string(),
            start_x: pointer_x,
            start_y: pointer_y,
            initial_top: style.top,
            initial_left: style.left,
        });
        Ok(())
    }

    /// Starts resizing the shared caption container
    pub fn begin_container_resize(&mut self, style: &CaptionStyle, pointer_x: f64) {
        self.gesture = Some(OverlayGesture::ResizeContainer {
            start_x: pointer_x,
            initial_width: self.container_width,
            initial_font_size: style.font_size,
        });
    }

    /// Starts resizing a text overlay's box
    pub fn begin_text_box_resize(
        &mut self,
        store: &CaptionStore,
        entity_id: &str,
        pointer_x: f64,
    ) -> StudioResult<()> {
        let entity = store
            .get(entity_id)
            .ok_or_else(|| StudioError::EntityNotFound(entity_id.to_string()))?;
        let style = entity.custom_style.clone().unwrap_or_default();
        self.gesture = Some(OverlayGesture::ResizeTextBox {
            entity_id: entity_id.to_string(),
            start_x: pointer_x,
            initial_width: style.width,
            initial_font_size: style.font_size,
        });
        Ok(())
    }

    // =========================================================================
    // Pointer Move / Up
    // =========================================================================

    /// Applies one pointer-move tick to the active canvas gesture
    pub fn pointer_move(
        &mut self,
        store: &mut CaptionStore,
        style: &mut CaptionStyle,
        pointer_x: f64,
        pointer_y: f64,
    ) -> StudioResult<()> {
        let Some(gesture) = self.gesture.clone() else {
            return Ok(());
        };

        match gesture {
            OverlayGesture::DragAnchor {
                start_x,
                start_y,
                initial_x_percent,
                initial_y_percent,
            } => {
                let dx_percent = (pointer_x - start_x) / self.canvas.width * 100.0;
                let dy_percent = (pointer_y - start_y) / self.canvas.height * 100.0;
                style.position_x = clamp_percent(initial_x_percent + dx_percent).round();
                style.position_y = clamp_percent(initial_y_percent + dy_percent).round();
            }

            OverlayGesture::DragWord {
                entity_id,
                word_index,
                start_x,
                start_y,
                initial_x,
                initial_y,
            } => {
                let dx = pointer_x - start_x;
                let dy = pointer_y - start_y;
                // Tiny jitters stay a click, not a move
                if dx.abs() < WORD_DRAG_DEADZONE_PX && dy.abs() < WORD_DRAG_DEADZONE_PX {
                    return Ok(());
                }
                let entity = store
                    .get_mut(&entity_id)
                    .ok_or_else(|| StudioError::EntityNotFound(entity_id.clone()))?;
                if let Some(word_style) = entity.word_style_mut(word_index) {
                    word_style.x = initial_x + dx;
                    word_style.y = initial_y + dy;
                }
            }

            OverlayGesture::DragTextBox {
                entity_id,
                start_x,
                start_y,
                initial_top,
                initial_left,
            } => {
                let dx_percent = (pointer_x - start_x) / self.canvas.width * 100.0;
                let dy_percent = (pointer_y - start_y) / self.canvas.height * 100.0;
                let entity = store
                    .get_mut(&entity_id)
                    .ok_or_else(|| StudioError::EntityNotFound(entity_id.clone()))?;
                let box_style = entity.custom_style.get_or_insert_with(Default::default);
                box_style.left = clamp_percent(initial_left + dx_percent);
                box_style.top = clamp_percent(initial_top + dy_percent);
            }

            OverlayGesture::ResizeContainer {
                start_x,
                initial_width,
                initial_font_size,
            } => {
                let (width, font_size) =
                    scaled_resize(initial_width, initial_font_size, pointer_x - start_x);
                self.container_width = width;
                style.font_size = font_size;
            }

            OverlayGesture::ResizeTextBox {
                entity_id,
                start_x,
                initial_width,
                initial_font_size,
            } => {
                let (width, font_size) =
                    scaled_resize(initial_width, initial_font_size, pointer_x - start_x);
                let entity = store
                    .get_mut(&entity_id)
                    .ok_or_else(|| StudioError::EntityNotFound(entity_id.clone()))?;
                let box_style = entity.custom_style.get_or_insert_with(Default::default);
                box_style.width = width;
                box_style.font_size = font_size;
            }
        }
        Ok(())
    }

    /// Ends the active canvas gesture
    pub fn end_gesture(&mut self) {
        if self.gesture.take().is_some() {
            debug!("End overlay gesture");
        }
    }
}

fn clamp_percent(value: f64) -> f64 {
    value.clamp(MIN_POSITION_PERCENT, MAX_POSITION_PERCENT)
}

/// Width-proportional font scaling shared by both resize gestures:
/// `new_font = round(old_font * new_width / old_width)`, with the width
/// clamped to 150-600 px and the font to 12-60 px.
fn scaled_resize(initial_width: f64, initial_font_size: f64, dx: f64) -> (f64, f64) {
    let new_width = (initial_width + dx).clamp(MIN_CONTAINER_WIDTH, MAX_CONTAINER_WIDTH);
    let ratio = new_width / initial_width;
    let new_font = (initial_font_size * ratio)
        .round()
        .clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
    (new_width, new_font)
}

// =============================================================================
// Tests
// =============================================================================

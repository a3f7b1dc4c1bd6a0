//! Caption Entity Store
//!
//! The single owned collection of timed entities. All mutations flow through
//! this store; the timeline controller and the overlay editor both read and
//! write it, and the editor session wraps discrete mutations in history
//! snapshots.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{EntityId, StudioError, StudioResult, TimeSec};

use super::{CaptionEntity, TextBoxKind};

/// Maximum number of live text overlays
pub const MAX_TEXT_OVERLAYS: usize = 6;

/// Gap inserted between the last caption and a manually added one, seconds
const NEW_CAPTION_GAP: TimeSec = 0.5;

/// Duration of a manually added caption, seconds
const NEW_CAPTION_DURATION: TimeSec = 2.0;

/// Duration of a text overlay with no speech caption to align to, seconds
const NEW_TEXT_BOX_DURATION: TimeSec = 3.0;

// =============================================================================
// Patch
// =============================================================================

/// Partial update applied to an entity via [`CaptionStore::update`]
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionPatch {
    pub text: Option<String>,
    pub start_time: Option<TimeSec>,
    pub end_time: Option<TimeSec>,
    /// `Some(None)` clears the animation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<Option<String>>,
}

impl CaptionPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn time_range(start_time: TimeSec, end_time: TimeSec) -> Self {
        Self {
            start_time: Some(start_time),
            end_time: Some(end_time),
            ..Default::default()
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// In-memory collection of caption entities.
///
/// Ordering invariant: text overlays first (insertion order), then speech
/// captions sorted by `start_time` ascending with no time overlap between
/// them. A move gesture may violate the ordering transiently; the gesture end
/// handler calls [`CaptionStore::normalize_order`] to restore it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaptionStore {
    entities: Vec<CaptionEntity>,
}

impl CaptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CaptionEntity> {
        self.entities.iter()
    }

    pub fn entities(&self) -> &[CaptionEntity] {
        &self.entities
    }

    pub fn get(&self, id: &str) -> Option<&CaptionEntity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut CaptionEntity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Speech captions in store order
    pub fn speech_captions(&self) -> impl Iterator<Item = &CaptionEntity> {
        self.entities.iter().filter(|e| !e.is_text_element)
    }

    /// Text overlays in store order
    pub fn text_overlays(&self) -> impl Iterator<Item = &CaptionEntity> {
        self.entities.iter().filter(|e| e.is_text_element)
    }

    pub fn text_overlay_count(&self) -> usize {
        self.text_overlays().count()
    }

    /// Speech captions live at the given playback time
    pub fn active_captions(&self, time: TimeSec) -> Vec<&CaptionEntity> {
        self.speech_captions()
            .filter(|e| e.is_visible_at(time))
            .collect()
    }

    /// Text overlays live at the given playback time
    pub fn active_overlays(&self, time: TimeSec) -> Vec<&CaptionEntity> {
        self.text_overlays()
            .filter(|e| e.is_visible_at(time))
            .collect()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds an entity.
    ///
    /// Speech captions must not overlap an existing speech caption; the
    /// store re-sorts after insertion. Text overlays are rejected once
    /// [`MAX_TEXT_OVERLAYS`] are live.
    pub fn add(&mut self, entity: CaptionEntity) -> StudioResult<()> {
        validate_time_range(entity.start_time, entity.end_time)?;

        if entity.is_text_element {
            if self.text_overlay_count() >= MAX_TEXT_OVERLAYS {
                return Err(StudioError::TextOverlayLimit(MAX_TEXT_OVERLAYS));
            }
        } else if let Some(other) = self
            .speech_captions()
            .find(|other| other.overlaps(&entity))
        {
            return Err(StudioError::CaptionOverlap {
                start: other.start_time,
                end: other.end_time,
            });
        }

        debug!(id = %entity.id, text_element = entity.is_text_element, "Adding entity");
        self.entities.push(entity);
        self.normalize_order();
        Ok(())
    }

    /// Adds a fresh speech caption after the last one and returns its ID
    pub fn add_caption(&mut self) -> StudioResult<EntityId> {
        let start = self
            .speech_captions()
            .last()
            .map(|c| c.end_time + NEW_CAPTION_GAP)
            .unwrap_or(0.0);
        let caption = CaptionEntity::create(start, start + NEW_CAPTION_DURATION, "New caption");
        let id = caption.id.clone();
        self.add(caption)?;
        Ok(id)
    }

    /// Adds a text overlay of the given kind, timed to the speech caption
    /// active at `current_time` when there is one, else `[t, t + 3s]`.
    pub fn add_text_box(
        &mut self,
        kind: TextBoxKind,
        current_time: TimeSec,
    ) -> StudioResult<EntityId> {
        if self.text_overlay_count() >= MAX_TEXT_OVERLAYS {
            return Err(StudioError::TextOverlayLimit(MAX_TEXT_OVERLAYS));
        }

        let (start, end) = match self
            .speech_captions()
            .find(|c| current_time >= c.start_time && current_time < c.end_time)
        {
            Some(active) => (active.start_time, active.end_time),
            None => {
                let t = current_time.max(0.0);
                (t, t + NEW_TEXT_BOX_DURATION)
            }
        };

        let element = CaptionEntity::create_text_box(kind, start, end);
        let id = element.id.clone();
        self.entities.push(element);
        debug!(id = %id, ?kind, "Added text box");
        Ok(id)
    }

    /// Applies a partial update to an entity
    pub fn update(&mut self, id: &str, patch: CaptionPatch) -> StudioResult<()> {
        let entity = self
            .get_mut(id)
            .ok_or_else(|| StudioError::EntityNotFound(id.to_string()))?;

        // Validate the merged time range before touching anything.
        let new_start = patch.start_time.unwrap_or(entity.start_time);
        let new_end = patch.end_time.unwrap_or(entity.end_time);
        validate_time_range(new_start, new_end)?;

        if let Some(text) = patch.text {
            entity.text = text;
        }
        entity.start_time = new_start;
        entity.end_time = new_end;
        if let Some(animation) = patch.animation {
            entity.animation = animation;
        }

        self.normalize_order();
        Ok(())
    }

    /// Removes an entity and returns it
    pub fn remove(&mut self, id: &str) -> StudioResult<CaptionEntity> {
        let pos = self
            .entities
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StudioError::EntityNotFound(id.to_string()))?;
        debug!(id, "Removing entity");
        Ok(self.entities.remove(pos))
    }

    /// Splits a speech caption in two at the given character offset.
    ///
    /// The original keeps `[start, midpoint]` with the first text half; a new
    /// entity takes `[midpoint, end]` with the second half, where
    /// `midpoint = (start + end) / 2` regardless of the offset. The split is
    /// rejected as a no-op when either trimmed half is empty. The original
    /// keeps its `word_styles` (stale keys are tolerated at read time); the
    /// new entity starts clean.
    pub fn split(&mut self, id: &str, at_text_offset: usize) -> StudioResult<EntityId> {
        let entity = self
            .get(id)
            .ok_or_else(|| StudioError::EntityNotFound(id.to_string()))?;
        if entity.is_text_element {
            return Err(StudioError::InvalidEditOperation(
                "Text boxes cannot be split".to_string(),
            ));
        }

        let chars: Vec<char> = entity.text.chars().collect();
        let offset = at_text_offset.min(chars.len());
        let first: String = chars[..offset].iter().collect::<String>().trim().to_string();
        let second: String = chars[offset..].iter().collect::<String>().trim().to_string();
        if first.is_empty() || second.is_empty() {
            return Err(StudioError::InvalidEditOperation(
                "Split would produce an empty caption".to_string(),
            ));
        }

        let midpoint = (entity.start_time + entity.end_time) / 2.0;
        let tail = CaptionEntity::create(midpoint, entity.end_time, &second);
        let tail_id = tail.id.clone();

        if let Some(entity) = self.get_mut(id) {
            entity.text = first;
            entity.end_time = midpoint;
        }

        debug!(id, tail_id = %tail_id, midpoint, "Split caption");
        self.entities.push(tail);
        self.normalize_order();
        Ok(tail_id)
    }

    /// Merges a speech caption with the one that follows it on the track.
    ///
    /// The merged caption spans both time ranges and joins the texts with a
    /// space; the follower is removed. Word styles of the first caption are
    /// kept (indices into the second caption's words are simply lost).
    pub fn merge_with_next(&mut self, id: &str) -> StudioResult<()> {
        let entity = self
            .get(id)
            .ok_or_else(|| StudioError::EntityNotFound(id.to_string()))?;
        if entity.is_text_element {
            return Err(StudioError::InvalidEditOperation(
                "Text boxes cannot be merged".to_string(),
            ));
        }

        let start_time = entity.start_time;
        let next = self
            .speech_captions()
            .filter(|c| c.start_time >= start_time && c.id != id)
            .min_by(|a, b| a.start_time.total_cmp(&b.start_time))
            .ok_or_else(|| {
                StudioError::InvalidEditOperation("No following caption to merge".to_string())
            })?;
        let next_id = next.id.clone();

        let removed = self.remove(&next_id)?;
        if let Some(entity) = self.get_mut(id) {
            if !removed.text.is_empty() {
                if !entity.text.is_empty() {
                    entity.text.push(' ');
                }
                entity.text.push_str(&removed.text);
            }
            entity.end_time = removed.end_time;
        }
        debug!(id, merged = %next_id, "Merged captions");
        self.normalize_order();
        Ok(())
    }

    /// Replaces the whole collection verbatim.
    ///
    /// Used by transcription import and by history restore; callers supply an
    /// already-ordered set.
    pub fn replace_all(&mut self, entities: Vec<CaptionEntity>) {
        debug!(count = entities.len(), "Replacing all entities");
        self.entities = entities;
    }

    /// Restores the ordering invariant: text overlays first, then speech
    /// captions sorted by `start_time`, all transient reorder markers
    /// cleared. This is the single point where ordering is repaired after a
    /// move gesture.
    pub fn normalize_order(&mut self) {
        for entity in &mut self.entities {
            entity.needs_reorder = false;
        }
        self.entities.sort_by(|a, b| {
            b.is_text_element.cmp(&a.is_text_element).then_with(|| {
                a.start_time
                    .partial_cmp(&b.start_time)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });
    }

    /// True when speech captions are sorted ascending with no overlap
    pub fn speech_invariants_hold(&self) -> bool {
        let speech: Vec<&CaptionEntity> = self.speech_captions().collect();
        speech
            .windows(2)
            .all(|w| w[0].start_time <= w[1].start_time && w[0].end_time <= w[1].start_time)
    }
}

fn validate_time_range(start: TimeSec, end: TimeSec) -> StudioResult<()> {
    if !start.is_finite() || !end.is_finite() || start < 0.0 {
        return Err(StudioError::InvalidTimeRange(start, end));
    }
    if start >= end {
        return Err(StudioError::InvalidTimeRange(start, end));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

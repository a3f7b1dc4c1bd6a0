//! Timeline Interaction Controller
//!
//! Pointer-driven drag/resize/move gestures on timeline blocks, plus seek,
//! zoom, and vertical scroll. Each pointer-move tick converts the pixel
//! delta to a time delta, runs the snapping engine, clamps to collision
//! bounds and the timeline, and commits the result to the entity store.
//! Once a gesture starts the controller owns it until pointer-up, no matter
//! where the pointer wanders.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{
    captions::{CaptionStore, WaveformPeak},
    StudioError, StudioResult, TimeSec,
};

use super::snap::{collision_bounds, snap_time, DragKind, SnapResult};

/// Minimum entity duration while resizing, seconds
pub const MIN_ENTITY_DURATION: TimeSec = 0.1;

/// Horizontal zoom range of the track container
pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 10.0;

// Track row geometry, pixels
pub const TEXT_ROW_HEIGHT: f64 = 22.0;
pub const TEXT_ROWS: usize = 6;
pub const SPEECH_ROW_HEIGHT: f64 = 30.0;
pub const WAVEFORM_ROW_HEIGHT: f64 = 34.0;
pub const VISIBLE_HEIGHT: f64 = 150.0;

/// Full stacked height of the track content
pub const TOTAL_CONTENT_HEIGHT: f64 =
    TEXT_ROWS as f64 * TEXT_ROW_HEIGHT + SPEECH_ROW_HEIGHT + WAVEFORM_ROW_HEIGHT + 16.0;

// =============================================================================
// Viewport
// =============================================================================

/// Zoom and scroll state of the track container
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineViewport {
    /// Horizontal scale factor (1x - 10x)
    pub zoom: f64,
    /// Vertical scroll offset in pixels
    pub scroll_pos: f64,
    /// Rendered track width in pixels at the current zoom
    pub track_width_px: f64,
}

impl Default for TimelineViewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            // Open scrolled to the bottom so the speech row is in view
            scroll_pos: max_scroll(),
            track_width_px: 1000.0,
        }
    }
}

/// Upper bound of the vertical scroll range
pub fn max_scroll() -> f64 {
    (TOTAL_CONTENT_HEIGHT - VISIBLE_HEIGHT).max(0.0)
}

// =============================================================================
// Drag State
// =============================================================================

/// State machine for the active gesture: `Idle` or one `Dragging` per
/// pointer capture.
#[derive(Clone, Debug, PartialEq)]
enum DragState {
    Idle,
    Dragging {
        entity_id: String,
        kind: DragKind,
        /// Pointer X at gesture start, pixels
        start_x: f64,
        /// The entity's start time at gesture start, or its end time for a
        /// right-edge resize
        start_time: TimeSec,
    },
}

// =============================================================================
// Controller
// =============================================================================

/// Owns the drag state machine and the viewport for one timeline
#[derive(Clone, Debug)]
pub struct TimelineController {
    viewport: TimelineViewport,
    drag: DragState,
    last_snap: Option<SnapResult>,
}

impl Default for TimelineController {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineController {
    pub fn new() -> Self {
        Self {
            viewport: TimelineViewport::default(),
            drag: DragState::Idle,
            last_snap: None,
        }
    }

    pub fn viewport(&self) -> &TimelineViewport {
        &self.viewport
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    /// The snap hit from the most recent pointer move, for the indicator line
    pub fn last_snap(&self) -> Option<SnapResult> {
        self.last_snap
    }

    // =========================================================================
    // Viewport Control
    // =========================================================================

    pub fn set_track_width(&mut self, width_px: f64) {
        if width_px > 0.0 && width_px.is_finite() {
            self.viewport.track_width_px = width_px;
        }
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.viewport.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn set_scroll(&mut self, pos: f64) {
        self.viewport.scroll_pos = pos.clamp(0.0, max_scroll());
    }

    pub fn scroll_by(&mut self, delta: f64) {
        self.set_scroll(self.viewport.scroll_pos + delta);
    }

    // =========================================================================
    // Seeking
    // =========================================================================

    /// Maps a click on empty track area to a playback time: the click's
    /// horizontal fraction of the track width times the duration.
    pub fn seek_time(&self, click_x: f64, duration: TimeSec) -> TimeSec {
        let width = self.viewport.track_width_px;
        let fraction = (click_x.clamp(0.0, width)) / width;
        fraction * duration
    }

    // =========================================================================
    // Drag Gestures
    // =========================================================================

    /// Starts a drag gesture on an entity block.
    ///
    /// Captures the pointer X and the entity's current start time (end time
    /// for a right-edge resize). History recording is the session's job and
    /// happens once per gesture, not here.
    pub fn begin_drag(
        &mut self,
        store: &CaptionStore,
        entity_id: &str,
        kind: DragKind,
        pointer_x: f64,
    ) -> StudioResult<()> {
        let entity = store
            .get(entity_id)
            .ok_or_else(|| StudioError::EntityNotFound(entity_id.to_string()))?;
        let start_time = match kind {
            DragKind::ResizeRight => entity.end_time,
            _ => entity.start_time,
        };
        debug!(entity_id, ?kind, start_time, "Begin timeline drag");
        self.drag = DragState::Dragging {
            entity_id: entity_id.to_string(),
            kind,
            start_x: pointer_x,
            start_time,
        };
        self.last_snap = None;
        Ok(())
    }

    /// Applies one pointer-move tick to the active gesture.
    ///
    /// Returns the snap result when the candidate time snapped, for UI
    /// feedback. A move preserves the entity's duration by shifting both
    /// endpoints together; resizes keep at least [`MIN_ENTITY_DURATION`].
    pub fn pointer_move(
        &mut self,
        store: &mut CaptionStore,
        duration: TimeSec,
        pointer_x: f64,
        peaks: &[WaveformPeak],
    ) -> StudioResult<Option<SnapResult>> {
        let DragState::Dragging {
            entity_id,
            kind,
            start_x,
            start_time,
        } = self.drag.clone()
        else {
            return Ok(None);
        };

        let delta_time = (pointer_x - start_x) / self.viewport.track_width_px * duration;
        let candidate = start_time + delta_time;

        let snap = snap_time(candidate, &entity_id, store.entities(), duration, peaks);
        let snapped_time = snap.time;
        self.last_snap = snap.snapped.then_some(snap);

        // Bounds come from the live (pre-tick) entity set every time.
        let entity = store
            .get(&entity_id)
            .ok_or_else(|| StudioError::EntityNotFound(entity_id.clone()))?;
        let bounds = collision_bounds(entity, store.entities(), kind, duration);
        let entity_duration = entity.duration();
        let is_speech = !entity.is_text_element;

        let entity = store
            .get_mut(&entity_id)
            .ok_or_else(|| StudioError::EntityNotFound(entity_id.clone()))?;
        match kind {
            DragKind::Move => {
                let mut new_start = snapped_time;
                new_start = new_start.max(bounds.min_start);
                new_start = new_start.min(bounds.max_end - entity_duration);
                new_start = new_start.clamp(0.0, (duration - entity_duration).max(0.0));
                entity.start_time = new_start;
                entity.end_time = new_start + entity_duration;
                if is_speech {
                    entity.needs_reorder = true;
                }
            }
            DragKind::ResizeLeft => {
                let mut new_start = snapped_time.max(bounds.min_start);
                new_start = new_start.clamp(0.0, entity.end_time - MIN_ENTITY_DURATION);
                entity.start_time = new_start;
            }
            DragKind::ResizeRight => {
                let mut new_end = snapped_time.min(bounds.max_end);
                new_end = new_end.clamp(entity.start_time + MIN_ENTITY_DURATION, duration);
                entity.end_time = new_end;
            }
        }

        Ok(self.last_snap)
    }

    /// Ends the active gesture.
    ///
    /// After a move of a speech caption this is the single point where
    /// ordering is restored: the store re-sorts speech captions by start
    /// time and strips the transient reorder markers. Returns true when a
    /// reorder pass ran.
    pub fn end_drag(&mut self, store: &mut CaptionStore) -> bool {
        let reordered = match &self.drag {
            DragState::Dragging {
                entity_id,
                kind: DragKind::Move,
                ..
            } => {
                let is_speech = store.get(entity_id).is_some_and(|e| !e.is_text_element);
                if is_speech {
                    store.normalize_order();
                }
                is_speech
            }
            _ => false,
        };
        if self.is_dragging() {
            debug!(reordered, "End timeline drag");
        }
        self.drag = DragState::Idle;
        self.last_snap = None;
        reordered
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::captions::CaptionEntity;

    const DURATION: TimeSec = 30.0;
    const WIDTH: f64 = 1000.0;

    fn store() -> CaptionStore {
        let mut store = CaptionStore::new();
        store.add(CaptionEntity::new("a", 0.0, 5.0, "Hello world")).unwrap();
        store
            .add(CaptionEntity::new("b", 5.0, 12.0, "This is a test"))
            .unwrap();
        store
            .add(CaptionEntity::new("c", 12.0, 20.0, "Final caption here"))
            .unwrap();
        store
    }

    fn controller() -> TimelineController {
        let mut ctrl = TimelineController::new();
        ctrl.set_track_width(WIDTH);
        ctrl
    }

    /// Pixel position that puts the dragged reference time at `target`
    fn px_for(start_x: f64, start_time: TimeSec, target: TimeSec) -> f64 {
        start_x + (target - start_time) / DURATION * WIDTH
    }

    #[test]
    fn test_seek_maps_fraction_to_time() {
        let ctrl = controller();
        assert_eq!(ctrl.seek_time(500.0, DURATION), 15.0);
        assert_eq!(ctrl.seek_time(0.0, DURATION), 0.0);
        // Clicks past the track edge clamp to the bounds
        assert_eq!(ctrl.seek_time(1500.0, DURATION), 30.0);
        assert_eq!(ctrl.seek_time(-40.0, DURATION), 0.0);
    }

    #[test]
    fn test_zoom_and_scroll_clamps() {
        let mut ctrl = controller();
        ctrl.set_zoom(0.5);
        assert_eq!(ctrl.viewport().zoom, 1.0);
        ctrl.set_zoom(25.0);
        assert_eq!(ctrl.viewport().zoom, 10.0);
        ctrl.set_zoom(3.5);
        assert_eq!(ctrl.viewport().zoom, 3.5);

        ctrl.set_scroll(-10.0);
        assert_eq!(ctrl.viewport().scroll_pos, 0.0);
        ctrl.set_scroll(1e6);
        assert_eq!(ctrl.viewport().scroll_pos, max_scroll());
    }

    #[test]
    fn test_move_drag_snaps_to_neighbor_edge() {
        // Pull caption "b" toward 4.9s; it snaps to caption "a"'s end at 5.0
        // and never overlaps "c".
        let mut store = store();
        let mut ctrl = controller();

        ctrl.begin_drag(&store, "b", DragKind::Move, 100.0).unwrap();
        let snap = ctrl
            .pointer_move(&mut store, DURATION, px_for(100.0, 5.0, 4.9), &[])
            .unwrap()
            .expect("should snap");
        assert_eq!(snap.time, 5.0);

        ctrl.end_drag(&mut store);
        let b = store.get("b").unwrap();
        assert_eq!(b.start_time, 5.0);
        assert_eq!(b.end_time, 12.0);
        assert!(store.speech_invariants_hold());
    }

    #[test]
    fn test_move_preserves_duration_under_clamping() {
        let mut store = store();
        let mut ctrl = controller();

        ctrl.begin_drag(&store, "a", DragKind::Move, 0.0).unwrap();
        // Try to fling the first caption far left of the timeline
        ctrl.pointer_move(&mut store, DURATION, -2000.0, &[]).unwrap();
        let a = store.get("a").unwrap();
        assert_eq!(a.start_time, 0.0);
        assert_eq!(a.duration(), 5.0);
    }

    #[test]
    fn test_move_respects_collision_bounds_for_any_delta() {
        let mut store = store();
        let mut ctrl = controller();

        ctrl.begin_drag(&store, "b", DragKind::Move, 0.0).unwrap();
        for px in [-5000.0, -120.0, 33.0, 400.0, 9000.0] {
            ctrl.pointer_move(&mut store, DURATION, px, &[]).unwrap();
            let b = store.get("b").unwrap();
            let bounds =
                collision_bounds(b, store.entities(), DragKind::Move, DURATION);
            assert!(bounds.min_start <= b.start_time);
            assert!(b.start_time <= b.end_time);
            assert!(b.end_time <= bounds.max_end);
        }
        ctrl.end_drag(&mut store);
        assert!(store.speech_invariants_hold());
    }

    #[test]
    fn test_resize_left_clamps_to_min_duration() {
        let mut store = store();
        let mut ctrl = controller();

        ctrl.begin_drag(&store, "b", DragKind::ResizeLeft, 0.0).unwrap();
        // Drag the left edge far past the right edge
        ctrl.pointer_move(&mut store, DURATION, px_for(0.0, 5.0, 14.0), &[])
            .unwrap();
        let b = store.get("b").unwrap();
        assert!((b.end_time - b.start_time - MIN_ENTITY_DURATION).abs() < 1e-9);
        assert_eq!(b.end_time, 12.0);
    }

    #[test]
    fn test_resize_right_is_bounded_by_follower() {
        let mut store = store();
        let mut ctrl = controller();

        ctrl.begin_drag(&store, "b", DragKind::ResizeRight, 0.0).unwrap();
        ctrl.pointer_move(&mut store, DURATION, px_for(0.0, 12.0, 18.0), &[])
            .unwrap();
        let b = store.get("b").unwrap();
        // Caption "c" starts at 12.0, so the right edge cannot pass it
        assert_eq!(b.end_time, 12.0);
    }

    #[test]
    fn test_resize_left_ignores_follower_bound() {
        let mut store = store();
        let mut ctrl = controller();

        ctrl.begin_drag(&store, "b", DragKind::ResizeLeft, 0.0).unwrap();
        ctrl.pointer_move(&mut store, DURATION, px_for(0.0, 5.0, 6.1), &[])
            .unwrap();
        let b = store.get("b").unwrap();
        assert!((b.start_time - 6.1).abs() < 1e-6);
    }

    #[test]
    fn test_gesture_end_restores_ordering() {
        let mut store = CaptionStore::new();
        store.add(CaptionEntity::new("a", 0.0, 2.0, "A")).unwrap();
        store.add(CaptionEntity::new("b", 10.0, 12.0, "B")).unwrap();
        let mut ctrl = controller();

        // Mid-gesture the entity carries the transient reorder marker.
        ctrl.begin_drag(&store, "b", DragKind::Move, 0.0).unwrap();
        ctrl.pointer_move(&mut store, DURATION, px_for(0.0, 10.0, 4.0), &[])
            .unwrap();
        assert!(store.get("b").unwrap().needs_reorder);

        let reordered = ctrl.end_drag(&mut store);
        assert!(reordered);
        assert!(!store.get("b").unwrap().needs_reorder);
        let starts: Vec<TimeSec> =
            store.speech_captions().map(|c| c.start_time).collect();
        assert!(starts.windows(2).all(|w| w[0] <= w[1]));
        assert!(store.speech_invariants_hold());
    }

    #[test]
    fn test_text_overlay_drag_is_unconstrained_and_skips_reorder() {
        let mut store = store();
        store
            .add_text_box(crate::core::captions::TextBoxKind::TextBox, 1.0)
            .unwrap();
        let overlay_id = store
            .text_overlays()
            .next()
            .unwrap()
            .id
            .clone();
        let mut ctrl = controller();

        ctrl.begin_drag(&store, &overlay_id, DragKind::Move, 0.0).unwrap();
        // Overlays slide freely across speech captions
        ctrl.pointer_move(&mut store, DURATION, px_for(0.0, 0.0, 8.0), &[])
            .unwrap();
        let overlay = store.get(&overlay_id).unwrap();
        assert!((overlay.start_time - 8.0).abs() < 1e-9);
        assert!(!overlay.needs_reorder);

        assert!(!ctrl.end_drag(&mut store));
    }

    #[test]
    fn test_pointer_move_without_gesture_is_noop() {
        let mut store = store();
        let mut ctrl = controller();
        let result = ctrl.pointer_move(&mut store, DURATION, 500.0, &[]).unwrap();
        assert!(result.is_none());
        assert_eq!(store.get("b").unwrap().start_time, 5.0);
    }

    #[test]
    fn test_snap_indicator_resets_when_not_snapped() {
        let mut store = store();
        let mut ctrl = controller();
        ctrl.begin_drag(&store, "b", DragKind::Move, 100.0).unwrap();

        ctrl.pointer_move(&mut store, DURATION, px_for(100.0, 5.0, 4.9), &[])
            .unwrap();
        assert!(ctrl.last_snap().is_some());

        ctrl.pointer_move(&mut store, DURATION, px_for(100.0, 5.0, 7.5), &[])
            .unwrap();
        assert!(ctrl.last_snap().is_none());
    }
}

//! Snapping & Collision Engine
//!
//! Pure functions over the entity set, the timeline duration, and the
//! waveform peaks. The gesture controller calls these on every pointer-move
//! tick; nothing here holds state or mutates the store.

use serde::{Deserialize, Serialize};

use crate::core::{
    captions::{CaptionEntity, WaveformPeak},
    TimeSec,
};

/// Magnetic snap threshold for timeline bounds and entity edges, seconds
pub const SNAP_THRESHOLD: TimeSec = 0.25;

/// Tighter snap threshold for waveform peaks, seconds. Precision audio
/// alignment is valued over generic alignment.
pub const WAVEFORM_SNAP_THRESHOLD: TimeSec = 0.15;

// =============================================================================
// Drag Kind
// =============================================================================

/// The kind of drag gesture in progress on a timeline block
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DragKind {
    /// Shift both endpoints, preserving duration
    Move,
    /// Drag the left edge (start time)
    ResizeLeft,
    /// Drag the right edge (end time)
    ResizeRight,
}

// =============================================================================
// Snap Result
// =============================================================================

/// What a candidate time snapped to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SnapKind {
    /// Timeline start or end
    Boundary,
    /// Another entity's start or end edge
    Element,
    /// A waveform peak
    Waveform,
}

/// Result of a snap query, fed back to the UI as the snap-indicator line
/// (emerald for waveform, yellow otherwise)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapResult {
    /// The adjusted time (equal to the input when nothing snapped)
    pub time: TimeSec,
    pub snapped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<SnapKind>,
}

impl SnapResult {
    fn unsnapped(time: TimeSec) -> Self {
        Self {
            time,
            snapped: false,
            kind: None,
        }
    }

    fn snapped(time: TimeSec, kind: SnapKind) -> Self {
        Self {
            time,
            snapped: true,
            kind: Some(kind),
        }
    }
}

// =============================================================================
// Snapping
// =============================================================================

/// Finds the magnetic snap target for a candidate time.
///
/// Snap points are the timeline bounds (`0` and `duration`), the start/end
/// edges of every entity other than the dragged one, and every waveform
/// peak. A waveform peak within [`WAVEFORM_SNAP_THRESHOLD`] wins over any
/// non-waveform point even if the latter is nominally closer; among
/// candidates of the same type, the closest wins.
pub fn snap_time(
    target: TimeSec,
    dragged_id: &str,
    entities: &[CaptionEntity],
    duration: TimeSec,
    peaks: &[WaveformPeak],
) -> SnapResult {
    let closest_peak = peaks
        .iter()
        .map(|p| (p.time, (p.time - target).abs()))
        .filter(|(_, diff)| *diff < WAVEFORM_SNAP_THRESHOLD)
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((time, _)) = closest_peak {
        return SnapResult::snapped(time, SnapKind::Waveform);
    }

    let mut points: Vec<(TimeSec, SnapKind)> =
        vec![(0.0, SnapKind::Boundary), (duration, SnapKind::Boundary)];
    for entity in entities.iter().filter(|e| e.id != dragged_id) {
        points.push((entity.start_time, SnapKind::Element));
        points.push((entity.end_time, SnapKind::Element));
    }

    let closest = points
        .into_iter()
        .map(|(time, kind)| (time, kind, (time - target).abs()))
        .filter(|(_, _, diff)| *diff < SNAP_THRESHOLD)
        .min_by(|a, b| a.2.total_cmp(&b.2));

    match closest {
        Some((time, kind, _)) => SnapResult::snapped(time, kind),
        None => SnapResult::unsnapped(target),
    }
}

// =============================================================================
// Collision Bounds
// =============================================================================

/// Legal time window for a drag, derived from neighboring speech captions
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionBounds {
    pub min_start: TimeSec,
    pub max_end: TimeSec,
}

/// Computes the legal bounds for dragging `entity`.
///
/// Text overlays are unconstrained (`[0, duration]`). For speech captions,
/// the lower bound is the end of the nearest preceding caption currently
/// ending at or before this entity's start; the upper bound is the start of
/// the nearest following one. Resizes only constrain the edge being dragged.
/// Bounds are recomputed from the live entity set on every tick, never
/// memoized across a gesture.
pub fn collision_bounds(
    entity: &CaptionEntity,
    entities: &[CaptionEntity],
    kind: DragKind,
    duration: TimeSec,
) -> CollisionBounds {
    let mut bounds = CollisionBounds {
        min_start: 0.0,
        max_end: duration,
    };
    if entity.is_text_element {
        return bounds;
    }

    for other in entities
        .iter()
        .filter(|e| e.id != entity.id && !e.is_text_element)
    {
        if matches!(kind, DragKind::Move | DragKind::ResizeLeft)
            && other.end_time <= entity.start_time
        {
            bounds.min_start = bounds.min_start.max(other.end_time);
        }
        if matches!(kind, DragKind::Move | DragKind::ResizeRight)
            && other.start_time >= entity.end_time
        {
            bounds.max_end = bounds.max_end.min(other.start_time);
        }
    }
    bounds
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entities() -> Vec<CaptionEntity> {
        vec![
            CaptionEntity::new("a", 0.0, 5.0, "First"),
            CaptionEntity::new("b", 5.0, 12.0, "Second"),
            CaptionEntity::new("c", 12.0, 20.0, "Third"),
        ]
    }

    fn peak(time: TimeSec) -> WaveformPeak {
        WaveformPeak {
            index: 0,
            time,
            amplitude: 0.8,
        }
    }

    #[test]
    fn test_snap_to_element_edge() {
        let result = snap_time(4.9, "b", &entities(), 30.0, &[]);
        assert!(result.snapped);
        assert_eq!(result.time, 5.0);
        assert_eq!(result.kind, Some(SnapKind::Element));
    }

    #[test]
    fn test_snap_to_timeline_boundary() {
        let result = snap_time(0.2, "a", &[], 30.0, &[]);
        assert_eq!(result.time, 0.0);
        assert_eq!(result.kind, Some(SnapKind::Boundary));

        let result = snap_time(29.8, "a", &[], 30.0, &[]);
        assert_eq!(result.time, 30.0);
        assert_eq!(result.kind, Some(SnapKind::Boundary));
    }

    #[test]
    fn test_no_snap_beyond_threshold() {
        let result = snap_time(7.0, "a", &entities(), 30.0, &[]);
        assert!(!result.snapped);
        assert_eq!(result.time, 7.0);
        assert_eq!(result.kind, None);
    }

    #[test]
    fn test_dragged_entity_edges_are_excluded() {
        // Entity "b" would snap to its own start if not excluded
        let only_b = vec![CaptionEntity::new("b", 5.0, 12.0, "Second")];
        let result = snap_time(5.1, "b", &only_b, 30.0, &[]);
        assert!(!result.snapped);
    }

    #[test]
    fn test_waveform_peak_beats_closer_element_edge() {
        // Element edge at 5.0 is closer to the target (diff 0.05) than the
        // peak at 5.19 (diff 0.14), but the peak is within its threshold and
        // always wins.
        let result = snap_time(5.05, "b", &entities(), 30.0, &[peak(5.19)]);
        assert!(result.snapped);
        assert_eq!(result.kind, Some(SnapKind::Waveform));
        assert!((result.time - 5.19).abs() < 1e-9);
    }

    #[test]
    fn test_waveform_peak_outside_tight_threshold_is_ignored() {
        // 0.2s from the peak: inside the generic threshold but outside the
        // waveform threshold, so the element edge wins.
        let result = snap_time(5.2, "c", &entities(), 30.0, &[peak(5.4)]);
        assert_eq!(result.kind, Some(SnapKind::Element));
        assert_eq!(result.time, 5.0);
    }

    #[test]
    fn test_closest_candidate_wins_within_type() {
        let result = snap_time(5.1, "x", &entities(), 30.0, &[peak(5.05), peak(5.2)]);
        assert!((result.time - 5.05).abs() < 1e-9);

        let result = snap_time(11.9, "x", &entities(), 30.0, &[]);
        assert_eq!(result.time, 12.0);
    }

    #[test]
    fn test_move_bounds_come_from_nearest_neighbors() {
        let all = entities();
        let bounds = collision_bounds(&all[1], &all, DragKind::Move, 30.0);
        assert_eq!(bounds.min_start, 5.0);
        assert_eq!(bounds.max_end, 12.0);
    }

    #[test]
    fn test_resize_bounds_constrain_one_edge() {
        let all = entities();
        let left = collision_bounds(&all[1], &all, DragKind::ResizeLeft, 30.0);
        assert_eq!(left.min_start, 5.0);
        assert_eq!(left.max_end, 30.0);

        let right = collision_bounds(&all[1], &all, DragKind::ResizeRight, 30.0);
        assert_eq!(right.min_start, 0.0);
        assert_eq!(right.max_end, 12.0);
    }

    #[test]
    fn test_text_overlays_are_unconstrained() {
        let mut all = entities();
        let mut overlay = CaptionEntity::new("t", 6.0, 9.0, "Overlay");
        overlay.is_text_element = true;
        all.push(overlay.clone());

        let bounds = collision_bounds(&overlay, &all, DragKind::Move, 30.0);
        assert_eq!(bounds.min_start, 0.0);
        assert_eq!(bounds.max_end, 30.0);

        // And overlays do not constrain speech captions either
        let speech = collision_bounds(&all[1], &all, DragKind::Move, 30.0);
        assert_eq!(speech.min_start, 5.0);
        assert_eq!(speech.max_end, 12.0);
    }

    #[test]
    fn test_edge_caption_bounds_reach_timeline_limits() {
        let all = entities();
        let first = collision_bounds(&all[0], &all, DragKind::Move, 30.0);
        assert_eq!(first.min_start, 0.0);
        assert_eq!(first.max_end, 5.0);

        let last = collision_bounds(&all[2], &all, DragKind::Move, 30.0);
        assert_eq!(last.min_start, 12.0);
        assert_eq!(last.max_end, 30.0);
    }
}

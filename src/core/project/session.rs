//! Editor Session
//!
//! The single owned store behind the whole editor. The timeline, the overlay
//! editor, and the style panel all read and write this one session; every
//! discrete mutation funnels through the snapshot-then-apply wrapper so undo
//! stays correct, and the session mirrors itself to durable storage after
//! each change.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{
    captions::{
        self, CaptionEntity, CaptionPatch, CaptionStore, CaptionStyle, TextBoxKind, Waveform,
        WaveformPeak, WordStyle,
    },
    history::{HistoryManager, HistorySnapshot},
    overlay::OverlayEditor,
    services::TranscriptSegment,
    timeline::{DragKind, SnapResult, TimelineController},
    EntityId, StudioError, StudioResult, TimeSec,
};

use super::persist::SessionSnapshot;

// =============================================================================
// Session Metadata
// =============================================================================

/// Metadata stored alongside the session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMeta {
    pub name: String,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
    /// Last modified timestamp (ISO 8601)
    pub modified_at: String,
}

impl SessionMeta {
    pub fn new(name: &str) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            name: name.to_string(),
            created_at: now.clone(),
            modified_at: now,
        }
    }

    /// Updates the modified timestamp
    pub fn touch(&mut self) {
        self.modified_at = chrono::Utc::now().to_rfc3339();
    }
}

// =============================================================================
// Editor Session
// =============================================================================

/// All state for one loaded video: entities, style, history, gesture
/// controllers, playback position, and the waveform.
pub struct EditorSession {
    meta: SessionMeta,
    store: CaptionStore,
    style: CaptionStyle,
    history: HistoryManager,
    timeline: TimelineController,
    overlay: OverlayEditor,
    duration: TimeSec,
    current_time: TimeSec,
    video_url: Option<String>,
    waveform: Option<Waveform>,
    waveform_peaks: Vec<WaveformPeak>,
    generating: bool,
    autosave_path: Option<PathBuf>,
}

impl EditorSession {
    pub fn new(name: &str) -> Self {
        Self {
            meta: SessionMeta::new(name),
            store: CaptionStore::new(),
            style: CaptionStyle::default(),
            history: HistoryManager::new(),
            timeline: TimelineController::new(),
            overlay: OverlayEditor::default(),
            duration: 0.0,
            current_time: 0.0,
            video_url: None,
            waveform: None,
            waveform_peaks: Vec::new(),
            generating: false,
            autosave_path: None,
        }
    }

    /// Mirrors the session to this path after every change
    pub fn with_autosave(mut self, path: PathBuf) -> Self {
        self.autosave_path = Some(path);
        self
    }

    /// Restores a session from a snapshot written by a previous run.
    /// History starts empty; undo does not cross reloads.
    pub fn restore(path: &std::path::Path) -> StudioResult<Self> {
        let snapshot = SessionSnapshot::load(path)?;
        let mut session = Self::new(&snapshot.meta.name);
        session.meta = snapshot.meta;
        session.video_url = snapshot.video_url;
        session.duration = snapshot.duration;
        session.style = snapshot.caption_style;
        session.store.replace_all(snapshot.captions);
        session.autosave_path = Some(path.to_path_buf());
        Ok(session)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn meta(&self) -> &SessionMeta {
        &self.meta
    }

    pub fn store(&self) -> &CaptionStore {
        &self.store
    }

    pub fn style(&self) -> &CaptionStyle {
        &self.style
    }

    pub fn timeline(&self) -> &TimelineController {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut TimelineController {
        &mut self.timeline
    }

    pub fn overlay(&self) -> &OverlayEditor {
        &self.overlay
    }

    pub fn duration(&self) -> TimeSec {
        self.duration
    }

    pub fn current_time(&self) -> TimeSec {
        self.current_time
    }

    pub fn video_url(&self) -> Option<&str> {
        self.video_url.as_deref()
    }

    pub fn waveform(&self) -> Option<&Waveform> {
        self.waveform.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    // =========================================================================
    // Video & Waveform
    // =========================================================================

    /// Loads a new video, resetting playback and the waveform
    pub fn load_video(&mut self, url: &str, duration: TimeSec) {
        debug!(url, duration, "Loading video");
        self.video_url = Some(url.to_string());
        self.duration = duration.max(0.0);
        self.current_time = 0.0;
        self.waveform = None;
        self.waveform_peaks = Vec::new();
        self.after_change();
    }

    /// Attaches the extracted waveform and derives its snap peaks once
    pub fn attach_waveform(&mut self, waveform: Waveform) {
        self.waveform_peaks = waveform.peaks();
        self.waveform = Some(waveform);
    }

    // =========================================================================
    // Playback
    // =========================================================================

    /// Seeks playback to a time, clamped to the video
    pub fn seek(&mut self, time: TimeSec) {
        self.current_time = time.clamp(0.0, self.duration);
    }

    /// Seeks from a click on empty timeline area
    pub fn seek_from_click(&mut self, click_x: f64) {
        let time = self.timeline.seek_time(click_x, self.duration);
        self.seek(time);
    }

    /// Playback-time poll from the video element. Same write as a seek;
    /// most recent write wins within a frame.
    pub fn playback_tick(&mut self, time: TimeSec) {
        self.seek(time);
    }

    // =========================================================================
    // Discrete Edits
    // =========================================================================

    /// Snapshot-then-apply wrapper for one discrete edit.
    ///
    /// Records the pre-mutation state, applies `apply`, and persists. On
    /// failure nothing is recorded and the store is left exactly as `apply`
    /// left it — mutators are expected to validate before touching state.
    pub fn commit<T>(
        &mut self,
        apply: impl FnOnce(&mut CaptionStore, &mut CaptionStyle) -> StudioResult<T>,
    ) -> StudioResult<T> {
        let pre = self.snapshot();
        let value = apply(&mut self.store, &mut self.style)?;
        self.history.record(pre);
        self.after_change();
        Ok(value)
    }

    /// Adds a fresh caption after the last one
    pub fn add_caption(&mut self) -> StudioResult<EntityId> {
        self.commit(|store, _| store.add_caption())
    }

    /// Adds a text overlay at the current playback time
    pub fn add_text_box(&mut self, kind: TextBoxKind) -> StudioResult<EntityId> {
        let time = self.current_time;
        self.commit(move |store, _| store.add_text_box(kind, time))
    }

    /// Applies a partial update to an entity
    pub fn update_caption(&mut self, id: &str, patch: CaptionPatch) -> StudioResult<()> {
        self.commit(|store, _| store.update(id, patch))
    }

    /// Splits a speech caption at a character offset
    pub fn split_caption(&mut self, id: &str, at_text_offset: usize) -> StudioResult<EntityId> {
        self.commit(|store, _| store.split(id, at_text_offset))
    }

    /// Merges a speech caption with the one following it
    pub fn merge_caption(&mut self, id: &str) -> StudioResult<()> {
        self.commit(|store, _| store.merge_with_next(id))
    }

    /// Deletes an entity
    pub fn delete_entity(&mut self, id: &str) -> StudioResult<CaptionEntity> {
        self.commit(|store, _| store.remove(id))
    }

    /// Replaces all entities with captions parsed from a subtitle file.
    /// Unlike generation, an import is an edit the user can undo.
    pub fn import_captions(&mut self, mut entities: Vec<CaptionEntity>) -> StudioResult<usize> {
        let count = entities.len();
        for entity in &mut entities {
            entity.is_text_element = false;
        }
        self.commit(move |store, _| {
            store.replace_all(entities);
            store.normalize_order();
            Ok(count)
        })
    }

    /// Replaces the global caption style (template apply, panel commit).
    /// Color fields are validated at this boundary.
    pub fn set_style(&mut self, mut style: CaptionStyle) -> StudioResult<()> {
        style.text_color = crate::core::normalize_hex_color(&style.text_color, "#ffffff");
        self.commit(move |_, current| {
            *current = style;
            Ok(())
        })
    }

    /// Applies a style change to one word as a discrete edit
    pub fn update_word_style(
        &mut self,
        entity_id: &str,
        word_index: usize,
        apply: impl FnOnce(&mut WordStyle),
    ) -> StudioResult<()> {
        self.commit(move |store, _| {
            OverlayEditor::update_word_style(store, entity_id, word_index, apply)
        })
    }

    /// Replaces all entities with a fresh transcript. This is a pipeline
    /// import, not an edit: history restarts from the generated state.
    pub(crate) fn apply_transcript(&mut self, segments: &[TranscriptSegment]) {
        let entities: Vec<CaptionEntity> = segments
            .iter()
            .filter(|s| !s.text.trim().is_empty())
            .map(|s| CaptionEntity::create(s.start, s.end, s.text.trim()))
            .collect();
        debug!(count = entities.len(), "Applying transcript");
        self.store.replace_all(entities);
        self.store.normalize_order();
        self.history.clear();
        self.after_change();
    }

    pub(crate) fn begin_generation(&mut self) -> StudioResult<()> {
        if self.generating {
            return Err(StudioError::GenerationInProgress);
        }
        self.generating = true;
        Ok(())
    }

    pub(crate) fn finish_generation(&mut self) {
        self.generating = false;
    }

    // =========================================================================
    // Undo / Redo
    // =========================================================================

    /// Restores the previous snapshot. No-op at the stack boundary;
    /// returns whether anything changed.
    pub fn undo(&mut self) -> bool {
        if !self.history.can_undo() {
            return false;
        }
        let current = self.snapshot();
        match self.history.undo(current) {
            Ok(snapshot) => {
                self.restore_snapshot(snapshot);
                true
            }
            Err(_) => false,
        }
    }

    /// Restores the next snapshot. No-op at the stack boundary.
    pub fn redo(&mut self) -> bool {
        if !self.history.can_redo() {
            return false;
        }
        let current = self.snapshot();
        match self.history.redo(current) {
            Ok(snapshot) => {
                self.restore_snapshot(snapshot);
                true
            }
            Err(_) => false,
        }
    }

    fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot::new(self.store.entities().to_vec(), self.style.clone())
    }

    fn restore_snapshot(&mut self, snapshot: HistorySnapshot) {
        self.store.replace_all(snapshot.captions);
        self.style = snapshot.caption_style;
        self.after_change();
    }

    // =========================================================================
    // Timeline Gestures
    // =========================================================================

    /// Starts a timeline drag, recording history exactly once for the whole
    /// gesture
    pub fn begin_timeline_drag(
        &mut self,
        entity_id: &str,
        kind: DragKind,
        pointer_x: f64,
    ) -> StudioResult<()> {
        let pre = self.snapshot();
        self.timeline.begin_drag(&self.store, entity_id, kind, pointer_x)?;
        self.history.record(pre);
        Ok(())
    }

    /// One pointer-move tick of the active timeline drag; intermediate
    /// frames never touch history
    pub fn timeline_pointer_move(&mut self, pointer_x: f64) -> StudioResult<Option<SnapResult>> {
        self.timeline.pointer_move(
            &mut self.store,
            self.duration,
            pointer_x,
            &self.waveform_peaks,
        )
    }

    /// Ends the active timeline drag, restoring speech ordering
    pub fn end_timeline_drag(&mut self) {
        self.timeline.end_drag(&mut self.store);
        self.after_change();
    }

    // =========================================================================
    // Overlay Gestures
    // =========================================================================

    /// Starts dragging a word on the video canvas. Entities with no such
    /// word (including empty text) accept no word interactions.
    pub fn begin_word_drag(
        &mut self,
        entity_id: &str,
        word_index: usize,
        pointer_x: f64,
        pointer_y: f64,
    ) -> bool {
        let pre = self.snapshot();
        let started =
            self.overlay
                .begin_word_drag(&self.store, entity_id, word_index, pointer_x, pointer_y);
        if started {
            self.history.record(pre);
        }
        started
    }

    /// Starts dragging the shared caption anchor
    pub fn begin_anchor_drag(&mut self, pointer_x: f64, pointer_y: f64) {
        let pre = self.snapshot();
        self.overlay.begin_anchor_drag(&self.style, pointer_x, pointer_y);
        self.history.record(pre);
    }

    /// Starts dragging a text overlay's own position
    pub fn begin_text_box_drag(
        &mut self,
        entity_id: &str,
        pointer_x: f64,
        pointer_y: f64,
    ) -> StudioResult<()> {
        let pre = self.snapshot();
        self.overlay
            .begin_text_box_drag(&self.store, entity_id, pointer_x, pointer_y)?;
        self.history.record(pre);
        Ok(())
    }

    /// Starts resizing the shared caption container
    pub fn begin_container_resize(&mut self, pointer_x: f64) {
        let pre = self.snapshot();
        self.overlay.begin_container_resize(&self.style, pointer_x);
        self.history.record(pre);
    }

    /// Starts resizing a text overlay's box
    pub fn begin_text_box_resize(&mut self, entity_id: &str, pointer_x: f64) -> StudioResult<()> {
        let pre = self.snapshot();
        self.overlay
            .begin_text_box_resize(&self.store, entity_id, pointer_x)?;
        self.history.record(pre);
        Ok(())
    }

    /// One pointer-move tick of the active overlay gesture
    pub fn overlay_pointer_move(&mut self, pointer_x: f64, pointer_y: f64) -> StudioResult<()> {
        self.overlay
            .pointer_move(&mut self.store, &mut self.style, pointer_x, pointer_y)
    }

    /// Ends the active overlay gesture
    pub fn end_overlay_gesture(&mut self) {
        self.overlay.end_gesture();
        self.after_change();
    }

    // =========================================================================
    // Export
    // =========================================================================

    pub fn export_srt(&self) -> String {
        captions::export_srt(self.store.entities())
    }

    pub fn export_vtt(&self) -> String {
        captions::export_vtt(self.store.entities())
    }

    /// Plain-text dump, also the clipboard payload
    pub fn export_plain_text(&self) -> String {
        captions::export_plain_text(self.store.entities())
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    fn after_change(&mut self) {
        self.meta.touch();
        self.autosave();
    }

    /// Mirrors the session to the autosave path. Persistence failures are
    /// logged, never surfaced: losing a mirror write must not block editing.
    fn autosave(&self) {
        let Some(path) = &self.autosave_path else {
            return;
        };
        if let Err(e) = SessionSnapshot::capture(self).save(path) {
            warn!("Session autosave failed: {}", e);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

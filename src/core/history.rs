//! History (Undo/Redo) Manager
//!
//! Deep-copy snapshots of `{captions, caption_style}` taken before each
//! discrete edit. Continuous gestures (drags, slider scrubs) record exactly
//! once at gesture start, never per intermediate frame. Undo and redo swap
//! the live state with the top of the respective stack, so N edits followed
//! by N undos and N redos restore the pre-edit-1 and post-edit-N states
//! bit-identically.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{
    captions::{CaptionEntity, CaptionStyle},
    StudioError, StudioResult,
};

/// Maximum number of undoable edits retained
pub const MAX_HISTORY_SIZE: usize = 100;

// =============================================================================
// Snapshot
// =============================================================================

/// Deep copy of everything a discrete edit can touch
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySnapshot {
    pub captions: Vec<CaptionEntity>,
    pub caption_style: CaptionStyle,
}

impl HistorySnapshot {
    pub fn new(captions: Vec<CaptionEntity>, caption_style: CaptionStyle) -> Self {
        Self {
            captions,
            caption_style,
        }
    }
}

// =============================================================================
// Manager
// =============================================================================

/// Stack-based undo/redo over [`HistorySnapshot`]s
#[derive(Debug, Default)]
pub struct HistoryManager {
    undo_stack: VecDeque<HistorySnapshot>,
    redo_stack: VecDeque<HistorySnapshot>,
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the pre-mutation state of a discrete edit.
    ///
    /// Clears the redo branch (a new edit invalidates it) and trims the
    /// oldest entries past [`MAX_HISTORY_SIZE`].
    pub fn record(&mut self, pre_state: HistorySnapshot) {
        self.redo_stack.clear();
        self.undo_stack.push_back(pre_state);
        while self.undo_stack.len() > MAX_HISTORY_SIZE {
            self.undo_stack.pop_front();
        }
        debug!(depth = self.undo_stack.len(), "Recorded history snapshot");
    }

    /// Pops the previous state, parking `current` on the redo stack
    pub fn undo(&mut self, current: HistorySnapshot) -> StudioResult<HistorySnapshot> {
        let previous = self.undo_stack.pop_back().ok_or(StudioError::NothingToUndo)?;
        self.redo_stack.push_back(current);
        Ok(previous)
    }

    /// Pops the next state, parking `current` back on the undo stack
    pub fn redo(&mut self, current: HistorySnapshot) -> StudioResult<HistorySnapshot> {
        let next = self.redo_stack.pop_back().ok_or(StudioError::NothingToRedo)?;
        self.undo_stack.push_back(current);
        Ok(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drops all history, undo and redo
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::captions::CaptionEntity;

    fn snapshot(text: &str) -> HistorySnapshot {
        HistorySnapshot::new(
            vec![CaptionEntity::new("c1", 0.0, 2.0, text)],
            CaptionStyle::default(),
        )
    }

    #[test]
    fn test_undo_redo_round_trip_restores_exact_states() {
        let mut history = HistoryManager::new();

        // Simulate N = 3 discrete edits over states s0 -> s1 -> s2 -> s3,
        // recording the pre-mutation state each time.
        let states: Vec<HistorySnapshot> =
            (0..4).map(|i| snapshot(&format!("state {}", i))).collect();
        let mut current = states[0].clone();
        for next in &states[1..] {
            history.record(current.clone());
            current = next.clone();
        }

        // N undos land on the pre-edit-1 state
        for expected in [&states[2], &states[1], &states[0]] {
            current = history.undo(current).unwrap();
            assert_eq!(&current, expected);
        }
        assert!(!history.can_undo());

        // N redos land back on the post-edit-N state
        for expected in [&states[1], &states[2], &states[3]] {
            current = history.redo(current).unwrap();
            assert_eq!(&current, expected);
        }
        assert_eq!(current, states[3]);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_boundaries_are_errors_not_corruption() {
        let mut history = HistoryManager::new();
        assert!(matches!(
            history.undo(snapshot("live")),
            Err(StudioError::NothingToUndo)
        ));
        assert!(matches!(
            history.redo(snapshot("live")),
            Err(StudioError::NothingToRedo)
        ));
        // A failed undo must not leak the current state into redo
        assert!(!history.can_redo());
        assert!(!history.can_undo());
    }

    #[test]
    fn test_new_edit_clears_redo_branch() {
        let mut history = HistoryManager::new();
        history.record(snapshot("s0"));
        let current = history.undo(snapshot("s1")).unwrap();
        assert!(history.can_redo());

        history.record(current);
        assert!(!history.can_redo());
        assert_eq!(history.undo_count(), 1);
    }

    #[test]
    fn test_history_is_trimmed_at_capacity() {
        let mut history = HistoryManager::new();
        for i in 0..(MAX_HISTORY_SIZE + 20) {
            history.record(snapshot(&format!("edit {}", i)));
        }
        assert_eq!(history.undo_count(), MAX_HISTORY_SIZE);

        // The oldest surviving entry is edit 20
        let mut oldest = snapshot("live");
        while history.can_undo() {
            oldest = history.undo(oldest).unwrap();
        }
        assert_eq!(oldest.captions[0].text, "edit 20");
    }
}

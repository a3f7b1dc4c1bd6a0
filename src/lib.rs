//! Caption Studio Engine
//!
//! Headless editing engine for a browser-based video-caption editor aimed at
//! short-form content creators. The crate owns the timed caption/text entity
//! store, the magnetic snapping and collision engine, the timeline drag
//! state machine, the word-level overlay editor with karaoke pacing, and the
//! undo/redo history — plus subtitle export and narrow async contracts for
//! the auth/credits, transcription, translation, and render collaborators.
//!
//! The embedding UI renders from this state and forwards pointer events into
//! it; the engine never touches a DOM or a GPU.

pub mod core;

pub use core::{
    captions::{CaptionEntity, CaptionStore, CaptionStyle, Waveform, WaveformPeak, WordStyle},
    history::{HistoryManager, HistorySnapshot},
    overlay::{highlight_range, OverlayEditor, WordRange},
    project::EditorSession,
    timeline::{CollisionBounds, DragKind, SnapKind, SnapResult, TimelineController},
    EntityId, StudioError, StudioResult, TimeSec,
};

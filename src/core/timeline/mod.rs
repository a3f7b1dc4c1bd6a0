//! Timeline Module
//!
//! The zoomable track view: magnetic snapping, collision bounds between
//! speech captions, and the pointer-driven drag/resize state machine.

pub mod gesture;
pub mod snap;

pub use gesture::{TimelineController, TimelineViewport};
pub use snap::{
    collision_bounds, snap_time, CollisionBounds, DragKind, SnapKind, SnapResult,
    SNAP_THRESHOLD, WAVEFORM_SNAP_THRESHOLD,
};

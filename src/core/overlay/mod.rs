//! Overlay Module
//!
//! Everything rendered over the video frame: karaoke-style word highlight
//! pacing and the direct-manipulation editor for words, caption blocks, and
//! text overlays.

pub mod editor;
pub mod highlight;

pub use editor::{OverlayEditor, WordSelection};
pub use highlight::{highlight_range, words_to_show, HighlightMemo, WordRange};

//! Caption Module
//!
//! Owns the timed caption/text entity model, the global caption style, the
//! entity store, subtitle format export/import, and waveform peak
//! extraction.
//!
//! # Overview
//!
//! Two kinds of entity share one store:
//! - Speech captions: bound to a shared global text-box position and ordered
//!   on a single non-overlapping track.
//! - Text overlays: free-floating graphic elements with independent screen
//!   positions, allowed to overlap anything, capped at 6 live instances.

pub mod formats;
pub mod models;
pub mod store;
pub mod style;
pub mod waveform;

pub use formats::{
    export_plain_text, export_srt, export_vtt, parse_srt, parse_vtt, ParseError,
};
pub use models::{CaptionEntity, TextAlignment, TextBoxKind, TextBoxStyle, WordStyle};
pub use store::{CaptionPatch, CaptionStore, MAX_TEXT_OVERLAYS};
pub use style::{Anchor, CaptionStyle, StyleTemplate, TextCase};
pub use waveform::{Waveform, WaveformPeak};

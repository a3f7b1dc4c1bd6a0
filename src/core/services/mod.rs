//! External Service Contracts
//!
//! The engine treats authentication/credits, transcription, translation,
//! and rendering as opaque collaborators behind narrow async traits. The
//! pipeline module orchestrates them; an HTTP-backed implementation lives
//! behind the `remote-services` feature.

pub mod credits;
pub mod pipeline;
pub mod render;
pub mod transcribe;
pub mod translate;

#[cfg(feature = "remote-services")]
pub mod http;

pub use credits::{CreditBalance, CreditsService};
pub use pipeline::{export_video, generate_captions, GenerationOptions};
pub use render::{ExportQuality, RenderOutput, RenderRequest, RenderService};
pub use transcribe::{
    MediaInput, Transcript, TranscriptSegment, TranscriptionService, MAX_UPLOAD_BYTES,
};
pub use translate::{translate_all, TranslatedSegment, TranslationService, TRANSLATION_BATCH_SIZE};

//! Generation & Export Pipelines
//!
//! Orchestrates the external collaborators around the session. Mutations
//! land in the entity store only after every external call has resolved:
//! a failed transcription, translation, or render leaves existing captions
//! untouched.

use tracing::{debug, warn};

use crate::core::{project::EditorSession, StudioError, StudioResult};

use super::{
    credits::CreditsService,
    render::{ExportQuality, RenderOutput, RenderRequest, RenderService},
    transcribe::{MediaInput, TranscriptSegment, TranscriptionService},
    translate::{translate_all, TranslationService},
};

// =============================================================================
// Generation
// =============================================================================

/// What to ask the AI pipeline for
#[derive(Clone, Debug)]
pub struct GenerationOptions {
    /// Language of the source audio
    pub language: String,
    /// Translate the transcript into this language when set
    pub translate_to: Option<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            language: "english".to_string(),
            translate_to: None,
        }
    }
}

impl GenerationOptions {
    pub fn language(language: &str) -> Self {
        Self {
            language: language.to_string(),
            translate_to: None,
        }
    }

    pub fn with_translation(mut self, target_language: &str) -> Self {
        self.translate_to = Some(target_language.to_string());
        self
    }
}

/// Runs the upload-to-captions pipeline: size gate, transcription, optional
/// translation, then a store replace.
///
/// The session's single-flight flag rejects a second generation while one is
/// running (the UI also disables the upload control). In-flight requests are
/// never cancelled. Returns the number of captions imported.
pub async fn generate_captions(
    session: &mut EditorSession,
    transcriber: &dyn TranscriptionService,
    translator: Option<&dyn TranslationService>,
    media: &MediaInput,
    options: &GenerationOptions,
) -> StudioResult<usize> {
    media.validate_size()?;
    session.begin_generation()?;

    let result = run_generation(transcriber, translator, media, options).await;
    session.finish_generation();

    let segments = result?;
    let count = segments.len();
    session.apply_transcript(&segments);
    debug!(count, "Caption generation complete");
    Ok(count)
}

async fn run_generation(
    transcriber: &dyn TranscriptionService,
    translator: Option<&dyn TranslationService>,
    media: &MediaInput,
    options: &GenerationOptions,
) -> StudioResult<Vec<TranscriptSegment>> {
    let transcript = transcriber.transcribe(media, &options.language).await?;

    let Some(target) = &options.translate_to else {
        return Ok(transcript.segments);
    };
    let Some(translator) = translator else {
        return Ok(transcript.segments);
    };

    let translated = translate_all(translator, &transcript.segments, target).await?;
    Ok(translated
        .into_iter()
        .map(|s| TranscriptSegment {
            start: s.start,
            end: s.end,
            text: s.text,
        })
        .collect())
}

// =============================================================================
// Export
// =============================================================================

/// Runs the burned-in video export: auth gate, credit check, render, then
/// credit deduction.
///
/// The render fee is only charged for a render that succeeded; a deduction
/// failure after a successful render is logged and the export still counts.
pub async fn export_video(
    session: &EditorSession,
    credits: &dyn CreditsService,
    renderer: &dyn RenderService,
    user_id: Option<&str>,
    quality: ExportQuality,
) -> StudioResult<RenderOutput> {
    let user_id = user_id.ok_or(StudioError::AuthRequired)?;

    let balance = credits.get_credits(user_id).await?;
    if !balance.has_remaining() {
        return Err(StudioError::InsufficientCredits);
    }

    let request = RenderRequest {
        captions: session.store().entities().to_vec(),
        style: session.style().clone(),
        quality,
    };
    let output = renderer.export(&request).await?;

    if let Err(e) = credits.deduct_credit(user_id).await {
        warn!("Credit deduction failed after successful render: {}", e);
    }
    debug!(quality = quality.as_str(), "Export complete");
    Ok(output)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::{CreditBalance, Transcript, TranslatedSegment};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    // -------------------------------------------------------------------------
    // Mock Services
    // -------------------------------------------------------------------------

    struct MockTranscriber {
        calls: AtomicU32,
        fail: bool,
    }

    impl MockTranscriber {
        fn ok() -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl TranscriptionService for MockTranscriber {
        async fn transcribe(&self, _media: &MediaInput, language: &str) -> StudioResult<Transcript> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StudioError::TranscriptionError("service unreachable".into()));
            }
            Ok(Transcript {
                segments: vec![
                    TranscriptSegment::new(0.0, 5.0, "Hello world"),
                    TranscriptSegment::new(5.0, 12.0, "This is a test"),
                    TranscriptSegment::new(12.0, 20.0, "Final caption here"),
                ],
                raw_text: "Hello world This is a test Final caption here".to_string(),
                language: language.to_string(),
            })
        }
    }

    struct MockTranslator;

    #[async_trait]
    impl TranslationService for MockTranslator {
        async fn translate_batch(
            &self,
            segments: &[TranscriptSegment],
            target_language: &str,
        ) -> StudioResult<Vec<TranslatedSegment>> {
            Ok(segments
                .iter()
                .map(|s| TranslatedSegment {
                    start: s.start,
                    end: s.end,
                    text: format!("{}:{}", target_language, s.text),
                    original: s.text.clone(),
                })
                .collect())
        }
    }

    struct MockCredits {
        remaining: u32,
        deductions: AtomicU32,
    }

    impl MockCredits {
        fn with_remaining(remaining: u32) -> Self {
            Self {
                remaining,
                deductions: AtomicU32::new(0),
            }
        }

        fn balance(&self) -> CreditBalance {
            CreditBalance {
                plan: "B".to_string(),
                total: 30,
                used: 30 - self.remaining,
                remaining: self.remaining,
                reset_date: "2026-09-01".to_string(),
            }
        }
    }

    #[async_trait]
    impl CreditsService for MockCredits {
        async fn get_credits(&self, _user_id: &str) -> StudioResult<CreditBalance> {
            Ok(self.balance())
        }

        async fn deduct_credit(&self, _user_id: &str) -> StudioResult<CreditBalance> {
            if self.remaining == 0 {
                return Err(StudioError::InsufficientCredits);
            }
            self.deductions.fetch_add(1, Ordering::SeqCst);
            Ok(self.balance())
        }
    }

    struct MockRenderer {
        calls: AtomicU32,
        fail: bool,
    }

    impl MockRenderer {
        fn ok() -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl RenderService for MockRenderer {
        async fn export(&self, _request: &RenderRequest) -> StudioResult<RenderOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StudioError::RenderError("encoder crashed".into()));
            }
            Ok(RenderOutput {
                video_url: "https://cdn.example.com/render.mp4".to_string(),
            })
        }
    }

    fn media() -> MediaInput {
        MediaInput::new("clip.mp4", vec![0; 2048])
    }

    fn session() -> EditorSession {
        let mut session = EditorSession::new("Pipeline");
        session.load_video("blob:clip", 30.0);
        session
    }

    // -------------------------------------------------------------------------
    // Generation Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_generation_populates_store() {
        let mut session = session();
        let transcriber = MockTranscriber::ok();

        let count = generate_captions(
            &mut session,
            &transcriber,
            None,
            &media(),
            &GenerationOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(count, 3);
        assert_eq!(session.store().len(), 3);
        assert!(session.store().speech_invariants_hold());
        assert!(!session.is_generating());
        assert_eq!(session.store().entities()[0].text, "Hello world");
    }

    #[tokio::test]
    async fn test_generation_with_translation() {
        let mut session = session();
        let transcriber = MockTranscriber::ok();
        let translator = MockTranslator;

        generate_captions(
            &mut session,
            &transcriber,
            Some(&translator),
            &media(),
            &GenerationOptions::language("english").with_translation("hindi"),
        )
        .await
        .unwrap();

        assert_eq!(session.store().entities()[0].text, "hindi:Hello world");
    }

    #[tokio::test]
    async fn test_transcription_failure_leaves_store_intact() {
        let mut session = session();
        session.apply_transcript(&[TranscriptSegment::new(0.0, 2.0, "Existing")]);
        let transcriber = MockTranscriber::failing();

        let err = generate_captions(
            &mut session,
            &transcriber,
            None,
            &media(),
            &GenerationOptions::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, StudioError::TranscriptionError(_)));
        assert_eq!(session.store().len(), 1);
        assert_eq!(session.store().entities()[0].text, "Existing");
        assert!(!session.is_generating());
    }

    #[tokio::test]
    async fn test_oversized_upload_never_reaches_service() {
        let mut session = session();
        let transcriber = MockTranscriber::ok();
        let oversized = MediaInput::new(
            "huge.mp4",
            vec![0; (super::super::transcribe::MAX_UPLOAD_BYTES + 1) as usize],
        );

        let err = generate_captions(
            &mut session,
            &transcriber,
            None,
            &oversized,
            &GenerationOptions::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, StudioError::UploadTooLarge { .. }));
        assert_eq!(transcriber.calls.load(Ordering::SeqCst), 0);
        assert!(!session.is_generating());
    }

    #[tokio::test]
    async fn test_second_generation_is_rejected_while_in_flight() {
        let mut session = session();
        session.begin_generation().unwrap();
        let transcriber = MockTranscriber::ok();

        let err = generate_captions(
            &mut session,
            &transcriber,
            None,
            &media(),
            &GenerationOptions::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, StudioError::GenerationInProgress));
        assert_eq!(transcriber.calls.load(Ordering::SeqCst), 0);
    }

    // -------------------------------------------------------------------------
    // Export Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_export_requires_auth() {
        let session = session();
        let credits = MockCredits::with_remaining(5);
        let renderer = MockRenderer::ok();

        let err = export_video(&session, &credits, &renderer, None, ExportQuality::Hd1080)
            .await
            .unwrap_err();
        assert!(matches!(err, StudioError::AuthRequired));
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_export_blocked_without_credits() {
        let session = session();
        let credits = MockCredits::with_remaining(0);
        let renderer = MockRenderer::ok();

        let err = export_video(
            &session,
            &credits,
            &renderer,
            Some("user-1"),
            ExportQuality::Hd1080,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, StudioError::InsufficientCredits));
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
        assert_eq!(credits.deductions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_export_success_deducts_one_credit() {
        let session = session();
        let credits = MockCredits::with_remaining(5);
        let renderer = MockRenderer::ok();

        let output = export_video(
            &session,
            &credits,
            &renderer,
            Some("user-1"),
            ExportQuality::Hd720,
        )
        .await
        .unwrap();

        assert_eq!(output.video_url, "https://cdn.example.com/render.mp4");
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(credits.deductions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_render_failure_charges_nothing() {
        let session = session();
        let credits = MockCredits::with_remaining(5);
        let renderer = MockRenderer::failing();

        let err = export_video(
            &session,
            &credits,
            &renderer,
            Some("user-1"),
            ExportQuality::Hd1080,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, StudioError::RenderError(_)));
        assert_eq!(credits.deductions.load(Ordering::SeqCst), 0);
    }
}

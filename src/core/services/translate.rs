//! Translation Service Contract
//!
//! Translates transcript segments into a target language. Segments are sent
//! in batches of five for throughput; every translated segment keeps the
//! original text alongside.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{StudioResult, TimeSec};

use super::TranscriptSegment;

/// Segments are translated in groups of this size
pub const TRANSLATION_BATCH_SIZE: usize = 5;

/// A translated segment, carrying its source text
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedSegment {
    pub start: TimeSec,
    pub end: TimeSec,
    pub text: String,
    pub original: String,
}

/// Translates one batch of segments.
///
/// Fails with [`crate::core::StudioError::TranslationError`]; implementations
/// receive at most [`TRANSLATION_BATCH_SIZE`] segments per call.
#[async_trait]
pub trait TranslationService: Send + Sync {
    async fn translate_batch(
        &self,
        segments: &[TranscriptSegment],
        target_language: &str,
    ) -> StudioResult<Vec<TranslatedSegment>>;
}

/// Translates a whole transcript, chunking into batches of
/// [`TRANSLATION_BATCH_SIZE`] and concatenating the results in order.
pub async fn translate_all(
    service: &dyn TranslationService,
    segments: &[TranscriptSegment],
    target_language: &str,
) -> StudioResult<Vec<TranslatedSegment>> {
    let mut translated = Vec::with_capacity(segments.len());
    for batch in segments.chunks(TRANSLATION_BATCH_SIZE) {
        translated.extend(service.translate_batch(batch, target_language).await?);
    }
    Ok(translated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Echo translator that records the size of every batch it receives
    struct EchoTranslator {
        batch_sizes: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl TranslationService for EchoTranslator {
        async fn translate_batch(
            &self,
            segments: &[TranscriptSegment],
            target_language: &str,
        ) -> StudioResult<Vec<TranslatedSegment>> {
            self.batch_sizes.lock().unwrap().push(segments.len());
            Ok(segments
                .iter()
                .map(|s| TranslatedSegment {
                    start: s.start,
                    end: s.end,
                    text: format!("[{}] {}", target_language, s.text),
                    original: s.text.clone(),
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn test_translate_all_batches_in_groups_of_five() {
        let service = EchoTranslator {
            batch_sizes: Mutex::new(Vec::new()),
        };
        let segments: Vec<TranscriptSegment> = (0..12)
            .map(|i| TranscriptSegment::new(i as f64, i as f64 + 1.0, &format!("seg {}", i)))
            .collect();

        let translated = translate_all(&service, &segments, "hindi").await.unwrap();

        assert_eq!(translated.len(), 12);
        assert_eq!(*service.batch_sizes.lock().unwrap(), vec![5, 5, 2]);
        // Order is preserved and originals are carried along
        assert_eq!(translated[7].original, "seg 7");
        assert_eq!(translated[7].text, "[hindi] seg 7");
    }
}

//! Karaoke Word Highlight Pacing
//!
//! Computes which word range of an active caption is emphasized at the
//! current playback time. This is a pure function of
//! `(text, start_time, end_time, current_time)` — no stored "current word"
//! state anywhere — and is recomputed every frame tick. The only caching
//! allowed is [`HighlightMemo`], keyed on the playback time rounded to the
//! hundredth.

use crate::core::{captions::CaptionEntity, TimeSec};

/// Inclusive range of word indices currently emphasized
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WordRange {
    pub start: usize,
    pub end: usize,
}

impl WordRange {
    pub fn contains(&self, word_index: usize) -> bool {
        word_index >= self.start && word_index <= self.end
    }

    /// Number of words in the range (always at least one)
    pub fn count(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Picks how many words are emphasized at once from the speech rate.
///
/// Slow delivery gets single-word emphasis; faster delivery groups words,
/// and a short phrase spoken very fast (five words or fewer) is shown whole.
/// Bucket boundaries: `< 2.0` wps → 1, `< 3.0` → 2, `< 4.5` → 2, else 3 or
/// the full phrase.
pub fn words_to_show(word_count: usize, words_per_second: f64) -> usize {
    if word_count == 0 {
        return 0;
    }
    let bucket = if words_per_second < 2.0 {
        1
    } else if words_per_second < 4.5 {
        2
    } else if word_count <= 5 {
        word_count
    } else {
        3
    };
    bucket.min(word_count)
}

/// Computes the emphasized word range for a caption at the given playback
/// time. Returns `None` for empty text or a non-positive duration.
///
/// The caption's words are partitioned into equal-duration beats of
/// `words_to_show` words each; the beat containing `current_time` selects
/// the range.
pub fn highlight_range(
    text: &str,
    start_time: TimeSec,
    end_time: TimeSec,
    current_time: TimeSec,
) -> Option<WordRange> {
    let word_count = text.split_whitespace().count();
    let duration = end_time - start_time;
    if word_count == 0 || duration <= 0.0 {
        return None;
    }

    let words_per_second = word_count as f64 / duration;
    let show = words_to_show(word_count, words_per_second);

    let groups = word_count.div_ceil(show);
    let group_duration = duration / groups as f64;
    let time_in_caption = (current_time - start_time).max(0.0);
    let group = ((time_in_caption / group_duration) as usize).min(groups - 1);

    let start = group * show;
    let end = (start + show - 1).min(word_count - 1);
    Some(WordRange { start, end })
}

// =============================================================================
// Memoization
// =============================================================================

/// Single-entry memo for the per-frame highlight computation.
///
/// Keyed on `(entity_id, current_time rounded to 10ms)`; anything smarter
/// risks drifting from the pure function it caches.
#[derive(Debug, Default)]
pub struct HighlightMemo {
    last: Option<(String, i64, Option<WordRange>)>,
}

impl HighlightMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn range(&mut self, entity: &CaptionEntity, current_time: TimeSec) -> Option<WordRange> {
        let key_time = (current_time * 100.0).round() as i64;
        if let Some((id, time, cached)) = &self.last {
            if *id == entity.id && *time == key_time {
                return *cached;
            }
        }
        let computed = highlight_range(
            &entity.text,
            entity.start_time,
            entity.end_time,
            current_time,
        );
        self.last = Some((entity.id.clone(), key_time, computed));
        computed
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_below_two_wps_is_single_word() {
        // 3 words over 2s = 1.5 wps
        assert_eq!(words_to_show(3, 1.5), 1);
        assert_eq!(words_to_show(10, 1.99), 1);
    }

    #[test]
    fn test_bucket_boundaries() {
        // Exactly 2.0 wps leaves the single-word bucket
        assert_eq!(words_to_show(6, 2.0), 2);
        // 3.0 wps stays in the two-word bucket
        assert_eq!(words_to_show(6, 3.0), 2);
        assert_eq!(words_to_show(6, 4.49), 2);
        // 4.5 wps crosses into fast speech
        assert_eq!(words_to_show(6, 4.5), 3);
    }

    #[test]
    fn test_fast_short_phrase_shows_whole_phrase() {
        // 5 words in 1s = 5 wps and <= 5 words: the full phrase
        assert_eq!(words_to_show(5, 5.0), 5);
        // 6 words spoken fast falls back to 3-word groups
        assert_eq!(words_to_show(6, 6.0), 3);
    }

    #[test]
    fn test_six_words_over_three_seconds_selects_two() {
        // 6 words / 3s = 2 wps
        let range = highlight_range("one two three four five six", 0.0, 3.0, 0.0).unwrap();
        assert_eq!(range.count(), 2);
        assert_eq!(range, WordRange { start: 0, end: 1 });
    }

    #[test]
    fn test_six_words_over_one_second_selects_three() {
        // 6 wps with more than 5 words: 3-word groups, not the full phrase
        let range = highlight_range("one two three four five six", 0.0, 1.0, 0.0).unwrap();
        assert_eq!(range.count(), 3);
    }

    #[test]
    fn test_beats_advance_with_playback_time() {
        // 6 words over 3s → 2-word beats of 1s each
        let text = "one two three four five six";
        assert_eq!(
            highlight_range(text, 0.0, 3.0, 0.5).unwrap(),
            WordRange { start: 0, end: 1 }
        );
        assert_eq!(
            highlight_range(text, 0.0, 3.0, 1.5).unwrap(),
            WordRange { start: 2, end: 3 }
        );
        assert_eq!(
            highlight_range(text, 0.0, 3.0, 2.5).unwrap(),
            WordRange { start: 4, end: 5 }
        );
    }

    #[test]
    fn test_time_past_end_clamps_to_last_beat() {
        let range = highlight_range("one two three four", 0.0, 2.0, 9.0).unwrap();
        assert_eq!(range.end, 3);
    }

    #[test]
    fn test_time_before_start_clamps_to_first_beat() {
        let range = highlight_range("one two three four", 5.0, 7.0, 1.0).unwrap();
        assert_eq!(range.start, 0);
    }

    #[test]
    fn test_uneven_final_group_is_truncated() {
        // 5 words at 2.5 wps → 2-word groups; the last group has one word
        let range = highlight_range("a b c d e", 0.0, 2.0, 1.99).unwrap();
        assert_eq!(range, WordRange { start: 4, end: 4 });
    }

    #[test]
    fn test_empty_text_and_zero_duration() {
        assert!(highlight_range("", 0.0, 3.0, 1.0).is_none());
        assert!(highlight_range("   ", 0.0, 3.0, 1.0).is_none());
        assert!(highlight_range("hello", 2.0, 2.0, 2.0).is_none());
    }

    #[test]
    fn test_memo_matches_direct_computation() {
        let entity =
            crate::core::captions::CaptionEntity::new("c1", 0.0, 3.0, "one two three four five six");
        let mut memo = HighlightMemo::new();

        for t in [0.0, 0.5, 1.5, 1.5, 2.9] {
            let direct = highlight_range(&entity.text, 0.0, 3.0, t);
            assert_eq!(memo.range(&entity, t), direct);
        }
    }
}

//! Waveform Extraction
//!
//! Downsamples audio into a normalized amplitude strip for the timeline's
//! audio row and detects the peaks the snapping engine treats as
//! high-priority snap targets. Extraction failures fall back silently to a
//! deterministic placeholder pattern so the timeline still renders an audio
//! row.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::core::TimeSec;

/// Number of amplitude buckets sampled per video
pub const DEFAULT_SAMPLE_COUNT: usize = 400;

/// Minimum normalized amplitude for a sample to count as a peak
pub const PEAK_AMPLITUDE_THRESHOLD: f32 = 0.4;

/// Minimum distance between accepted peaks, in samples
pub const PEAK_MIN_SAMPLE_GAP: usize = 5;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while extracting a waveform
#[derive(Error, Debug)]
pub enum WaveformError {
    #[error("Failed to read audio: {0}")]
    Decode(String),

    #[error("Unsupported bit depth: {0}")]
    UnsupportedBitDepth(u16),

    #[error("Audio stream is empty")]
    EmptyAudio,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type WaveformResult<T> = Result<T, WaveformError>;

// =============================================================================
// Waveform Peak
// =============================================================================

/// A detected audio peak: a local amplitude maximum above
/// [`PEAK_AMPLITUDE_THRESHOLD`] at least [`PEAK_MIN_SAMPLE_GAP`] samples
/// after the previous accepted peak.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveformPeak {
    /// Sample index within the waveform strip
    pub index: usize,
    /// Timeline time of the peak in seconds
    pub time: TimeSec,
    /// Normalized amplitude (0.0 - 1.0)
    pub amplitude: f32,
}

// =============================================================================
// Waveform
// =============================================================================

/// Normalized amplitude strip for one loaded video, with derived peaks.
///
/// Computed once when the video loads and read-only afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waveform {
    /// Amplitude per bucket, normalized to 0.0 - 1.0
    pub samples: Vec<f32>,
    /// Duration of the underlying media in seconds
    pub duration: TimeSec,
    /// True when the samples are the placeholder pattern, not real audio
    pub is_placeholder: bool,
}

impl Waveform {
    /// Builds a waveform from raw PCM samples in the -1.0..1.0 range
    pub fn from_samples(raw: &[f32], duration: TimeSec, bucket_count: usize) -> WaveformResult<Self> {
        if raw.is_empty() || bucket_count == 0 {
            return Err(WaveformError::EmptyAudio);
        }
        Ok(Self {
            samples: downsample(raw, bucket_count),
            duration,
            is_placeholder: false,
        })
    }

    /// Loads the first channel of a WAV file and builds a waveform from it
    pub fn from_wav_file(path: &Path, duration: TimeSec) -> WaveformResult<Self> {
        let raw = load_wav_samples(path)?;
        Self::from_samples(&raw, duration, DEFAULT_SAMPLE_COUNT)
    }

    /// Loads a waveform from a WAV file, falling back to the placeholder
    /// pattern when extraction fails. The failure is logged, never surfaced.
    pub fn load_or_placeholder(path: &Path, duration: TimeSec) -> Self {
        match Self::from_wav_file(path, duration) {
            Ok(waveform) => waveform,
            Err(e) => {
                warn!("Waveform extraction failed ({}), using placeholder", e);
                Self::placeholder(duration)
            }
        }
    }

    /// A deterministic pseudo-random pattern standing in for real audio
    pub fn placeholder(duration: TimeSec) -> Self {
        let samples = (0..DEFAULT_SAMPLE_COUNT)
            .map(|i| {
                let seed = (i as f32 * 0.3).sin() * (i as f32 * 0.17).cos();
                (seed.abs() * 0.6 + 0.05).min(1.0)
            })
            .collect();
        Self {
            samples,
            duration,
            is_placeholder: true,
        }
    }

    /// Detects snap-target peaks. The placeholder pattern deliberately
    /// yields none: fake audio must not attract snaps.
    pub fn peaks(&self) -> Vec<WaveformPeak> {
        if self.is_placeholder {
            return Vec::new();
        }
        detect_peaks(&self.samples, self.duration)
    }
}

// =============================================================================
// Extraction Functions
// =============================================================================

/// Downsamples raw audio into `bucket_count` mean-absolute-amplitude buckets,
/// normalized so the loudest bucket is 1.0.
pub fn downsample(raw: &[f32], bucket_count: usize) -> Vec<f32> {
    let block_size = (raw.len() / bucket_count).max(1);
    let mut samples: Vec<f32> = (0..bucket_count)
        .map(|i| {
            let start = (block_size * i).min(raw.len());
            let end = (start + block_size).min(raw.len());
            if start == end {
                return 0.0;
            }
            raw[start..end].iter().map(|s| s.abs()).sum::<f32>() / (end - start) as f32
        })
        .collect();

    let max = samples.iter().cloned().fold(0.0_f32, f32::max);
    if max > 0.0 {
        for s in &mut samples {
            *s /= max;
        }
    }
    samples
}

/// Finds local maxima above the amplitude threshold, enforcing the minimum
/// sample gap from the previously accepted peak.
pub fn detect_peaks(samples: &[f32], duration: TimeSec) -> Vec<WaveformPeak> {
    let mut peaks: Vec<WaveformPeak> = Vec::new();
    if samples.len() < 3 || duration <= 0.0 {
        return peaks;
    }

    for i in 1..samples.len() - 1 {
        let (prev, curr, next) = (samples[i - 1], samples[i], samples[i + 1]);
        if curr > prev && curr > next && curr > PEAK_AMPLITUDE_THRESHOLD {
            let far_enough = peaks
                .last()
                .map_or(true, |last| i - last.index >= PEAK_MIN_SAMPLE_GAP);
            if far_enough {
                peaks.push(WaveformPeak {
                    index: i,
                    time: (i as f64 / samples.len() as f64) * duration,
                    amplitude: curr,
                });
            }
        }
    }
    peaks
}

/// Loads the first channel of a WAV file as f32 samples in -1.0..1.0
fn load_wav_samples(path: &Path) -> WaveformResult<Vec<f32>> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| WaveformError::Decode(format!("Failed to open WAV file: {}", e)))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, _) => reader
            .into_samples::<f32>()
            .filter_map(Result::ok)
            .collect(),
        (hound::SampleFormat::Int, 16) => reader
            .into_samples::<i16>()
            .filter_map(Result::ok)
            .map(|s| s as f32 / 32768.0)
            .collect(),
        (hound::SampleFormat::Int, 32) => reader
            .into_samples::<i32>()
            .filter_map(Result::ok)
            .map(|s| s as f32 / 2147483648.0)
            .collect(),
        (hound::SampleFormat::Int, bits) => {
            return Err(WaveformError::UnsupportedBitDepth(bits));
        }
    };

    if interleaved.is_empty() {
        return Err(WaveformError::EmptyAudio);
    }

    // Keep channel 0; speech amplitude is what the timeline visualizes.
    Ok(interleaved.into_iter().step_by(channels).collect())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_downsample_normalizes_to_unit_peak() {
        let raw: Vec<f32> = (0..1000).map(|i| if i < 500 { 0.1 } else { 0.4 }).collect();
        let samples = downsample(&raw, 10);
        assert_eq!(samples.len(), 10);
        assert!((samples[9] - 1.0).abs() < 1e-6);
        assert!((samples[0] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_downsample_silence() {
        let samples = downsample(&[0.0; 100], 10);
        assert!(samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_detect_peaks_threshold_and_gap() {
        // Two clear local maxima above threshold, 10 samples apart, plus a
        // sub-threshold bump and one too close to the first peak.
        let mut samples = vec![0.0_f32; 30];
        samples[5] = 0.9;
        samples[7] = 0.8; // within min gap of index 5, skipped
        samples[15] = 0.7;
        samples[25] = 0.2; // below threshold

        let peaks = detect_peaks(&samples, 30.0);
        let indices: Vec<usize> = peaks.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![5, 15]);
        assert!((peaks[0].time - 5.0).abs() < 1e-9);
        assert_eq!(peaks[0].amplitude, 0.9);
    }

    #[test]
    fn test_detect_peaks_empty_or_zero_duration() {
        assert!(detect_peaks(&[0.5, 0.9], 10.0).is_empty());
        assert!(detect_peaks(&[0.0, 0.9, 0.0], 0.0).is_empty());
    }

    #[test]
    fn test_placeholder_has_no_peaks() {
        let waveform = Waveform::placeholder(30.0);
        assert!(waveform.is_placeholder);
        assert_eq!(waveform.samples.len(), DEFAULT_SAMPLE_COUNT);
        assert!(waveform.samples.iter().all(|&s| (0.0..=1.0).contains(&s)));
        assert!(waveform.peaks().is_empty());
    }

    #[test]
    fn test_load_or_placeholder_falls_back_silently() {
        let waveform =
            Waveform::load_or_placeholder(Path::new("/nonexistent/audio.wav"), 12.0);
        assert!(waveform.is_placeholder);
        assert_eq!(waveform.duration, 12.0);
    }

    #[test]
    fn test_from_wav_file() {
        let temp_dir = TempDir::new().unwrap();
        let wav_path = temp_dir.path().join("test.wav");

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&wav_path, spec).unwrap();
        for i in 0..16000 {
            let sample = ((i as f32 / 40.0).sin() * 12000.0) as i16;
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();

        let waveform = Waveform::from_wav_file(&wav_path, 1.0).unwrap();
        assert!(!waveform.is_placeholder);
        assert_eq!(waveform.samples.len(), DEFAULT_SAMPLE_COUNT);
        assert!(waveform.samples.iter().all(|&s| (0.0..=1.0).contains(&s)));
    }

    #[test]
    fn test_from_samples_rejects_empty() {
        assert!(matches!(
            Waveform::from_samples(&[], 10.0, 100),
            Err(WaveformError::EmptyAudio)
        ));
    }
}

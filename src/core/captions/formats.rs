//! Subtitle Format Export and Import
//!
//! Produces SRT (SubRip), WebVTT, and plain-text exports from the entity
//! store, and parses SRT/VTT files back into speech captions. Text overlays
//! are screen graphics, not subtitles: every exporter skips them, along with
//! entities whose text is empty.

use thiserror::Error;

use super::CaptionEntity;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while parsing a subtitle file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Missing data: {0}")]
    MissingData(String),
}

// =============================================================================
// Export
// =============================================================================

fn exportable(entities: &[CaptionEntity]) -> Vec<&CaptionEntity> {
    let mut captions: Vec<&CaptionEntity> = entities
        .iter()
        .filter(|e| !e.is_text_element && !e.text.is_empty())
        .collect();
    captions.sort_by(|a, b| {
        a.start_time
            .partial_cmp(&b.start_time)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    captions
}

/// Exports speech captions to SRT.
///
/// Each cue is `"{n}\n{start} --> {end}\n{text}\n"`; cues are joined with a
/// blank line. A single caption at 1.5~3.25s with text "Hi" produces exactly
/// `"1\n00:00:01,500 --> 00:00:03,250\nHi\n"`.
pub fn export_srt(entities: &[CaptionEntity]) -> String {
    exportable(entities)
        .iter()
        .enumerate()
        .map(|(index, caption)| {
            format!(
                "{}\n{} --> {}\n{}\n",
                index + 1,
                format_srt_timestamp(caption.start_time),
                format_srt_timestamp(caption.end_time),
                caption.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Exports speech captions to WebVTT
pub fn export_vtt(entities: &[CaptionEntity]) -> String {
    let cues = exportable(entities)
        .iter()
        .map(|caption| {
            format!(
                "{} --> {}\n{}\n",
                format_vtt_timestamp(caption.start_time),
                format_vtt_timestamp(caption.end_time),
                caption.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("WEBVTT\n\n{}", cues)
}

/// Exports the bare caption text, one caption per line. Doubles as the
/// clipboard payload.
pub fn export_plain_text(entities: &[CaptionEntity]) -> String {
    exportable(entities)
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats seconds as an SRT timestamp (00:00:00,000)
fn format_srt_timestamp(seconds: f64) -> String {
    let (hours, mins, secs, ms) = split_timestamp(seconds);
    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, ms)
}

/// Formats seconds as a VTT timestamp (00:00:00.000)
fn format_vtt_timestamp(seconds: f64) -> String {
    let (hours, mins, secs, ms) = split_timestamp(seconds);
    format!("{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
}

fn split_timestamp(seconds: f64) -> (u64, u64, u64, u64) {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    (total_secs / 3600, total_secs / 60 % 60, total_secs % 60, ms)
}

// =============================================================================
// Import
// =============================================================================

/// Parses SRT content into speech captions
pub fn parse_srt(content: &str) -> Result<Vec<CaptionEntity>, ParseError> {
    let mut captions = Vec::new();

    for block in blocks(content) {
        let mut lines = block.iter();
        let first = lines.next().ok_or_else(|| {
            ParseError::MissingData("Empty subtitle block".to_string())
        })?;

        // The sequence-number line is optional in the wild; a block may open
        // directly with the timestamp line.
        let timestamp_line = if first.contains("-->") {
            first
        } else {
            lines
                .next()
                .ok_or_else(|| ParseError::MissingData("Timestamp line".to_string()))?
        };
        let (start, end) = parse_cue_times(timestamp_line)?;

        let text = lines.copied().collect::<Vec<_>>().join("\n");
        if text.is_empty() {
            return Err(ParseError::MissingData("Caption text".to_string()));
        }
        captions.push(CaptionEntity::create(start, end, &text));
    }

    Ok(captions)
}

/// Parses WebVTT content into speech captions
pub fn parse_vtt(content: &str) -> Result<Vec<CaptionEntity>, ParseError> {
    let mut block_iter = blocks(content).into_iter();

    let header = block_iter.next().unwrap_or_default();
    if !header
        .first()
        .is_some_and(|line| line.starts_with("WEBVTT"))
    {
        return Err(ParseError::InvalidFormat(
            "VTT file must start with WEBVTT".to_string(),
        ));
    }

    let mut captions = Vec::new();
    for block in block_iter {
        let mut lines = block.iter();
        let first = lines
            .next()
            .ok_or_else(|| ParseError::MissingData("Empty cue".to_string()))?;

        // NOTE and STYLE blocks carry no cues
        if first.starts_with("NOTE") || first.starts_with("STYLE") {
            continue;
        }

        // An optional cue identifier precedes the timestamp line
        let timestamp_line = if first.contains("-->") {
            first
        } else {
            lines
                .next()
                .ok_or_else(|| ParseError::MissingData("Timestamp line".to_string()))?
        };
        let (start, end) = parse_cue_times(timestamp_line)?;

        let text = lines
            .map(|l| strip_vtt_tags(l))
            .collect::<Vec<_>>()
            .join("\n");
        if text.is_empty() {
            return Err(ParseError::MissingData("Caption text".to_string()));
        }
        captions.push(CaptionEntity::create(start, end, &text));
    }

    Ok(captions)
}

/// Splits subtitle content into blank-line-separated blocks of trimmed lines
fn blocks(content: &str) -> Vec<Vec<&str>> {
    let mut out: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in content.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Parses a cue timing line (`"start --> end"`, cue settings tolerated)
fn parse_cue_times(line: &str) -> Result<(f64, f64), ParseError> {
    let (start_str, rest) = line.split_once("-->").ok_or_else(|| {
        ParseError::InvalidFormat(format!("Expected 'start --> end' format: {}", line))
    })?;
    let end_str = rest.trim().split_whitespace().next().unwrap_or("");
    Ok((
        parse_timestamp(start_str.trim())?,
        parse_timestamp(end_str)?,
    ))
}

/// Parses `HH:MM:SS,mmm`, `HH:MM:SS.mmm`, or the short VTT `MM:SS.mmm` form
fn parse_timestamp(ts: &str) -> Result<f64, ParseError> {
    let normalized = ts.replace(',', ".");
    let parts: Vec<&str> = normalized.split(':').collect();

    let invalid = || ParseError::InvalidTimestamp(ts.to_string());
    let field = |s: &str| s.parse::<f64>().map_err(|_| invalid());

    match parts.as_slice() {
        [m, s] => Ok(field(m)? * 60.0 + field(s)?),
        [h, m, s] => Ok(field(h)? * 3600.0 + field(m)? * 60.0 + field(s)?),
        _ => Err(invalid()),
    }
}

/// Strips `<...>` formatting tags from a VTT text line
fn strip_vtt_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

// =============================================================================
// Tests
// =============================================================================

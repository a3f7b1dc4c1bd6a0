//! Render/Export Service Contract
//!
//! Burned-in video export runs on an external render service. The engine
//! sends captions plus style and gets a video URL back; credit deduction is
//! orchestrated around the call by the pipeline.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{
    captions::{CaptionEntity, CaptionStyle},
    StudioResult,
};

/// Output quality of a rendered export
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ExportQuality {
    #[default]
    Hd1080,
    Hd720,
}

impl ExportQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hd1080 => "1080p",
            Self::Hd720 => "720p",
        }
    }
}

/// Everything the render service needs to burn captions in
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub captions: Vec<CaptionEntity>,
    pub style: CaptionStyle,
    pub quality: ExportQuality,
}

/// A finished render
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOutput {
    pub video_url: String,
}

/// Renders caption + style data into a video file.
///
/// Fails with [`crate::core::StudioError::RenderError`], or with the
/// distinguished [`crate::core::StudioError::InsufficientCredits`] when the
/// service itself rejects the job for quota.
#[async_trait]
pub trait RenderService: Send + Sync {
    async fn export(&self, request: &RenderRequest) -> StudioResult<RenderOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_strings() {
        assert_eq!(ExportQuality::Hd1080.as_str(), "1080p");
        assert_eq!(ExportQuality::Hd720.as_str(), "720p");
    }

    #[test]
    fn test_render_request_serialization() {
        let request = RenderRequest {
            captions: vec![CaptionEntity::new("c1", 0.0, 2.0, "Hi")],
            style: CaptionStyle::default(),
            quality: ExportQuality::Hd720,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"quality\":\"hd720\""));
    }
}

//! HTTP-Backed Service Implementations
//!
//! One client for all four collaborators, talking to the Caption Studio
//! backend. Transport failures and error statuses are mapped onto the
//! engine's error taxonomy at this boundary; nothing deeper in the engine
//! sees an HTTP detail.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::core::{StudioError, StudioResult};

use super::{
    credits::{CreditBalance, CreditsService},
    render::{RenderOutput, RenderRequest, RenderService},
    transcribe::{MediaInput, Transcript, TranscriptSegment, TranscriptionService},
    translate::{TranslatedSegment, TranslationService},
};

/// HTTP client for the remote credits/transcription/translation/render
/// services
pub struct HttpServices {
    base_url: String,
    client: reqwest::Client,
}

impl HttpServices {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Maps an error response onto the taxonomy. 401 is a login prompt, 402 an
/// upgrade prompt; anything else becomes the caller-supplied error kind.
async fn map_error(
    response: reqwest::Response,
    wrap: impl FnOnce(String) -> StudioError,
) -> StudioError {
    let status = response.status();
    match status.as_u16() {
        401 => StudioError::AuthRequired,
        402 => StudioError::InsufficientCredits,
        _ => {
            let body = response.text().await.unwrap_or_default();
            wrap(format!("HTTP {}: {}", status, body))
        }
    }
}

fn transport_error(e: reqwest::Error) -> StudioError {
    StudioError::ServiceUnreachable(e.to_string())
}

// =============================================================================
// Credits
// =============================================================================

#[derive(Deserialize)]
struct CreditsResponse {
    credits: CreditBalance,
}

#[async_trait]
impl CreditsService for HttpServices {
    async fn get_credits(&self, user_id: &str) -> StudioResult<CreditBalance> {
        let response = self
            .client
            .post(self.endpoint("/api/credits"))
            .json(&serde_json::json!({ "action": "get", "user_id": user_id }))
            .send()
            .await
            .map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(map_error(response, StudioError::ServiceUnreachable).await);
        }
        let body: CreditsResponse = response.json().await.map_err(transport_error)?;
        Ok(body.credits)
    }

    async fn deduct_credit(&self, user_id: &str) -> StudioResult<CreditBalance> {
        let response = self
            .client
            .post(self.endpoint("/api/credits"))
            .json(&serde_json::json!({ "action": "deduct", "user_id": user_id }))
            .send()
            .await
            .map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(map_error(response, StudioError::ServiceUnreachable).await);
        }
        let body: CreditsResponse = response.json().await.map_err(transport_error)?;
        Ok(body.credits)
    }
}

// =============================================================================
// Transcription
// =============================================================================

#[async_trait]
impl TranscriptionService for HttpServices {
    async fn transcribe(&self, media: &MediaInput, language: &str) -> StudioResult<Transcript> {
        debug!(file = %media.file_name, language, "Uploading media for transcription");
        let part = reqwest::multipart::Part::bytes(media.data.clone())
            .file_name(media.file_name.clone());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("language", language.to_string());

        let response = self
            .client
            .post(self.endpoint("/api/transcribe"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| StudioError::TranscriptionError(e.to_string()))?;
        if !response.status().is_success() {
            return Err(map_error(response, StudioError::TranscriptionError).await);
        }
        response
            .json()
            .await
            .map_err(|e| StudioError::TranscriptionError(e.to_string()))
    }
}

// =============================================================================
// Translation
// =============================================================================

#[async_trait]
impl TranslationService for HttpServices {
    async fn translate_batch(
        &self,
        segments: &[TranscriptSegment],
        target_language: &str,
    ) -> StudioResult<Vec<TranslatedSegment>> {
        #[derive(Deserialize)]
        struct TranslateResponse {
            segments: Vec<TranslatedSegment>,
        }

        let response = self
            .client
            .post(self.endpoint("/api/translate"))
            .json(&serde_json::json!({
                "segments": segments,
                "target_language": target_language,
            }))
            .send()
            .await
            .map_err(|e| StudioError::TranslationError(e.to_string()))?;
        if !response.status().is_success() {
            return Err(map_error(response, StudioError::TranslationError).await);
        }
        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| StudioError::TranslationError(e.to_string()))?;
        Ok(body.segments)
    }
}

// =============================================================================
// Render
// =============================================================================

#[async_trait]
impl RenderService for HttpServices {
    async fn export(&self, request: &RenderRequest) -> StudioResult<RenderOutput> {
        debug!(quality = request.quality.as_str(), "Requesting render");
        let response = self
            .client
            .post(self.endpoint("/api/export"))
            .json(request)
            .send()
            .await
            .map_err(|e| StudioError::RenderError(e.to_string()))?;
        if !response.status().is_success() {
            return Err(map_error(response, StudioError::RenderError).await);
        }
        response
            .json()
            .await
            .map_err(|e| StudioError::RenderError(e.to_string()))
    }
}

//! Driven port for the third-party grading and identification service.
//!
//! Adapters own transport and decoding: they send base64 images, map HTTP
//! failures to [`GradingProviderError`], and turn response bodies into
//! validated domain values. A body that decodes but lacks required grades
//! is a [`GradingProviderError::MalformedResponse`].

use async_trait::async_trait;

use crate::domain::{GradingReport, IdentificationMatch};

use super::define_port_error;

define_port_error! {
    /// Errors raised by grading provider adapters.
    pub enum GradingProviderError {
        /// The provider rejected the request (4xx other than 408/429).
        InvalidRequest { message: String } => "grading provider rejected request: {message}",
        /// The provider throttled us.
        RateLimited { message: String } => "grading provider rate limited: {message}",
        /// The call timed out.
        Timeout { message: String } => "grading provider timed out: {message}",
        /// Network failure or 5xx.
        Transport { message: String } => "grading provider transport failed: {message}",
        /// Response body missing required fields or not JSON.
        MalformedResponse { message: String } => "grading provider response malformed: {message}",
    }
}

/// Base64-encoded card faces for a grading call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradingImages {
    /// Front face, standard base64.
    pub front_base64: String,
    /// Back face, standard base64.
    pub back_base64: String,
}

/// Overlay image downloaded from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayImage {
    /// Image bytes.
    pub bytes: Vec<u8>,
    /// MIME type reported by the provider.
    pub content_type: String,
}

/// External grading service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GradingProvider: Send + Sync {
    /// Grade a card from both faces.
    async fn grade(&self, images: &GradingImages) -> Result<GradingReport, GradingProviderError>;

    /// Identify a card from one base64 image; best match first.
    async fn identify(
        &self,
        image_base64: &str,
    ) -> Result<Vec<IdentificationMatch>, GradingProviderError>;

    /// Download a provider-hosted overlay image.
    async fn fetch_overlay(&self, url: &str) -> Result<OverlayImage, GradingProviderError>;
}

//! Generation Backend
//!
//! The two upstream operation kinds the dispatcher relies on.

use crate::api::{GeneratedImage, Schema};
use crate::credentials::Credential;
use crate::error::UpstreamError;
use async_trait::async_trait;

/// Schema-constrained text generation request
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub model: String,
    pub prompt: String,
    /// Authoritative shape of the JSON the model must return
    pub schema: Schema,
}

/// Image generation request
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub number_of_images: u32,
    /// e.g. `"1:1"`
    pub aspect_ratio: String,
    pub output_mime_type: String,
}

/// A generation service reachable with a single credential per call
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate JSON text conforming to `request.schema`
    async fn generate_structured(
        &self,
        credential: &Credential,
        request: &StructuredRequest,
    ) -> Result<String, UpstreamError>;

    /// Generate images; the result may be empty
    async fn generate_images(
        &self,
        credential: &Credential,
        request: &ImageRequest,
    ) -> Result<Vec<GeneratedImage>, UpstreamError>;
}

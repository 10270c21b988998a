//! Scripted backend for dispatcher tests.

use crate::api::GeneratedImage;
use crate::client::backend::{GenerationBackend, ImageRequest, StructuredRequest};
use crate::credentials::Credential;
use crate::error::UpstreamError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Replays queued replies in order and records every call it receives
#[derive(Default)]
pub struct StubBackend {
    structured: Mutex<VecDeque<Result<String, UpstreamError>>>,
    images: Mutex<VecDeque<Result<Vec<GeneratedImage>, UpstreamError>>>,
    credentials: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_text(self, text: impl Into<String>) -> Self {
        self.structured.lock().push_back(Ok(text.into()));
        self
    }

    pub fn reply_json(self, value: serde_json::Value) -> Self {
        self.reply_text(value.to_string())
    }

    pub fn fail_text(self, err: UpstreamError) -> Self {
        self.structured.lock().push_back(Err(err));
        self
    }

    pub fn reply_images(self, images: Vec<GeneratedImage>) -> Self {
        self.images.lock().push_back(Ok(images));
        self
    }

    pub fn fail_images(self, err: UpstreamError) -> Self {
        self.images.lock().push_back(Err(err));
        self
    }

    /// Credentials seen so far, in call order
    pub fn credentials(&self) -> Vec<String> {
        self.credentials.lock().clone()
    }

    /// Prompts seen so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    fn record(&self, credential: &Credential, prompt: &str) {
        self.credentials.lock().push(credential.expose().to_string());
        self.prompts.lock().push(prompt.to_string());
    }
}

#[async_trait]
impl GenerationBackend for StubBackend {
    async fn generate_structured(
        &self,
        credential: &Credential,
        request: &StructuredRequest,
    ) -> Result<String, UpstreamError> {
        self.record(credential, &request.prompt);
        self.structured
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(UpstreamError::EmptyResponse("stub has no reply queued".into())))
    }

    async fn generate_images(
        &self,
        credential: &Credential,
        request: &ImageRequest,
    ) -> Result<Vec<GeneratedImage>, UpstreamError> {
        self.record(credential, &request.prompt);
        self.images
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(UpstreamError::EmptyResponse("stub has no reply queued".into())))
    }
}

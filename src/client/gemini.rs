//! Gemini and Imagen REST backend.

use crate::api::{GeneratedImage, Schema};
use crate::client::backend::{GenerationBackend, ImageRequest, StructuredRequest};
use crate::client::http::HttpClient;
use crate::config::Settings;
use crate::credentials::Credential;
use crate::error::{Result, UpstreamError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Backend talking to the Generative Language API
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    http: HttpClient,
    base_url: String,
}

impl GeminiBackend {
    /// Create a backend for `base_url` with the transport timeouts from `settings`
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = HttpClient::new(
            Duration::from_secs(settings.timeout_secs),
            Duration::from_secs(settings.connect_timeout_secs),
        )?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate_structured(
        &self,
        credential: &Credential,
        request: &StructuredRequest,
    ) -> std::result::Result<String, UpstreamError> {
        let url = self.model_url(&request.model, "generateContent");
        let body = GenerateContentRequest::new(&request.prompt, &request.schema);

        let response: GenerateContentResponse = self.http.post_json(&url, &body, credential).await?;
        let text = response.into_text()?;
        debug!(model = %request.model, bytes = text.len(), "Structured response received");

        Ok(text)
    }

    async fn generate_images(
        &self,
        credential: &Credential,
        request: &ImageRequest,
    ) -> std::result::Result<Vec<GeneratedImage>, UpstreamError> {
        let url = self.model_url(&request.model, "predict");
        let body = PredictRequest::from_image_request(request);

        let response: PredictResponse = self.http.post_json(&url, &body, credential).await?;
        let images = response.into_images(&request.output_mime_type);
        debug!(model = %request.model, images = images.len(), "Image response received");

        Ok(images)
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Schema,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(prompt: &'a str, schema: &'a Schema) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate
    fn into_text(self) -> std::result::Result<String, UpstreamError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(UpstreamError::EmptyResponse(format!(
                "prompt blocked: {}",
                reason
            )));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::EmptyResponse("no candidates".into()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
            return Err(UpstreamError::EmptyResponse(format!(
                "no text in response (finish reason: {})",
                reason
            )));
        }

        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    instances: Vec<PredictInstance<'a>>,
    parameters: PredictParameters<'a>,
}

#[derive(Debug, Serialize)]
struct PredictInstance<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters<'a> {
    sample_count: u32,
    aspect_ratio: &'a str,
    output_mime_type: &'a str,
}

impl<'a> PredictRequest<'a> {
    fn from_image_request(req: &'a ImageRequest) -> Self {
        Self {
            instances: vec![PredictInstance {
                prompt: &req.prompt,
            }],
            parameters: PredictParameters {
                sample_count: req.number_of_images,
                aspect_ratio: &req.aspect_ratio,
                output_mime_type: &req.output_mime_type,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    rai_filtered_reason: Option<String>,
}

impl PredictResponse {
    /// Images carrying a payload; filtered predictions are dropped
    fn into_images(self, default_mime_type: &str) -> Vec<GeneratedImage> {
        self.predictions
            .into_iter()
            .filter_map(|p| {
                if let Some(reason) = &p.rai_filtered_reason {
                    debug!(reason = %reason, "Image prediction filtered");
                }
                let image_bytes = p.bytes_base64_encoded?;
                Some(GeneratedImage {
                    image_bytes,
                    mime_type: p.mime_type.unwrap_or_else(|| default_mime_type.to_string()),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::schema;
    use mockito::Matcher;
    use serde_json::json;

    const KEY: &str = "AIzaSy-gemini-test-key-42";

    fn backend(base_url: &str) -> GeminiBackend {
        let settings = Settings {
            base_url: base_url.to_string(),
            ..Settings::default()
        };
        GeminiBackend::new(&settings).unwrap()
    }

    fn credential() -> Credential {
        Credential::parse(KEY).unwrap()
    }

    fn image_request() -> ImageRequest {
        ImageRequest {
            model: "imagen-3.0-generate-001".to_string(),
            prompt: "a small rusty robot".to_string(),
            number_of_images: 1,
            aspect_ratio: "1:1".to_string(),
            output_mime_type: "image/png".to_string(),
        }
    }

    #[test]
    fn test_request_serialization_uses_camel_case() {
        let schema = schema::story_ideas();
        let body = GenerateContentRequest::new("hello", &schema);
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(value["generationConfig"]["responseSchema"]["type"], "ARRAY");
        assert!(value.get("generation_config").is_none());
    }

    #[test]
    fn test_predict_request_shape() {
        let request = image_request();
        let value = serde_json::to_value(PredictRequest::from_image_request(&request)).unwrap();
        assert_eq!(
            value,
            json!({
                "instances": [{ "prompt": "a small rusty robot" }],
                "parameters": {
                    "sampleCount": 1,
                    "aspectRatio": "1:1",
                    "outputMimeType": "image/png"
                }
            })
        );
    }

    #[test]
    fn test_into_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "[{\"title\":" }, { "text": "\"a\"}]" }] },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "[{\"title\":\"a\"}]");
    }

    #[test]
    fn test_into_text_blocked_prompt() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [],
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        let err = response.into_text().unwrap_err();
        assert_eq!(err.to_string(), "empty response: prompt blocked: SAFETY");
    }

    #[test]
    fn test_into_text_without_candidates() {
        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            response.into_text(),
            Err(UpstreamError::EmptyResponse(_))
        ));
    }

    #[test]
    fn test_into_images_skips_filtered() {
        let response: PredictResponse = serde_json::from_value(json!({
            "predictions": [
                { "raiFilteredReason": "filtered" },
                { "bytesBase64Encoded": "iVBORw0KGgo=" },
                { "bytesBase64Encoded": "AAAA", "mimeType": "image/jpeg" }
            ]
        }))
        .unwrap();

        let images = response.into_images("image/png");
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].mime_type, "image/png");
        assert_eq!(images[1].mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_generate_structured_round_trip() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.0-flash:generateContent")
            .match_header("x-goog-api-key", KEY)
            .match_body(Matcher::PartialJson(json!({
                "generationConfig": { "responseMimeType": "application/json" }
            })))
            .with_status(200)
            .with_body(
                json!({
                    "candidates": [{
                        "content": { "parts": [{ "text": "[{\"title\":\"T\",\"summary\":\"S\"}]" }] }
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let request = StructuredRequest {
            model: "gemini-2.0-flash".to_string(),
            prompt: "ideas please".to_string(),
            schema: schema::story_ideas(),
        };
        let text = backend(&server.url())
            .generate_structured(&credential(), &request)
            .await
            .unwrap();

        assert_eq!(text, "[{\"title\":\"T\",\"summary\":\"S\"}]");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_images_empty_predictions() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/imagen-3.0-generate-001:predict")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let images = backend(&server.url())
            .generate_images(&credential(), &image_request())
            .await
            .unwrap();
        assert!(images.is_empty());
    }

    #[tokio::test]
    async fn test_generate_images_billing_error_text() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/imagen-3.0-generate-001:predict")
            .with_status(400)
            .with_body(
                json!({
                    "error": {
                        "code": 400,
                        "message": "Imagen API is only accessible to billed users at this time.",
                        "status": "INVALID_ARGUMENT"
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let err = backend(&server.url())
            .generate_images(&credential(), &image_request())
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "API error 400: INVALID_ARGUMENT: Imagen API is only accessible to billed users at this time."
        );
    }
}

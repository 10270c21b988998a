//! Taleforge - story, character and script generation
//!
//! An async client for a generative AI service that produces story ideas,
//! character sheets, character portraits and video scripts. Every call draws
//! the next API key from a round-robin pool, and every upstream failure is
//! classified into a small set of actionable errors.

use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

pub mod api;
pub mod classify;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;

use api::prompts::{self, ScriptPrompt};
use api::schema;
pub use api::{Character, GeneratedImage, Scene, Schema, Script, Story};
pub use classify::Operation;
use client::{GeminiBackend, GenerationBackend, ImageRequest, StructuredRequest};
use config::{ConfigLoader, Settings};
use credentials::KeyPool;
pub use error::{Result, TaleforgeError, UpstreamError};

/// The main generation client
pub struct StoryClient {
    /// Models, languages and pacing
    settings: Settings,

    /// Keys drawn round-robin, one per call
    pool: KeyPool,

    /// Upstream service
    backend: Arc<dyn GenerationBackend>,
}

impl StoryClient {
    /// Create a client from `.env`, the environment and the default settings files
    pub fn new() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let loader = ConfigLoader::new()?;
        Self::from_settings(loader.into_config())
    }

    /// Create a client with a custom settings file
    pub fn with_config_path(path: impl AsRef<Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let loader = ConfigLoader::from_path(path)?;
        Self::from_settings(loader.into_config())
    }

    /// Create a client talking to the Gemini REST API
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let pool = KeyPool::from_config(&settings.credentials);
        let backend = GeminiBackend::new(&settings)?;
        Ok(Self::from_parts(settings, pool, Arc::new(backend)))
    }

    /// Assemble a client from explicit parts
    pub fn from_parts(
        settings: Settings,
        pool: KeyPool,
        backend: Arc<dyn GenerationBackend>,
    ) -> Self {
        Self {
            settings,
            pool,
            backend,
        }
    }

    /// The key pool, for diagnostics
    pub fn pool(&self) -> &KeyPool {
        &self.pool
    }

    /// The settings this client was built with
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Generate up to `count` story ideas from a seed idea
    pub async fn generate_story_ideas(
        &self,
        idea: &str,
        style: &str,
        count: usize,
    ) -> Result<Vec<Story>> {
        ensure_positive("count", count)?;

        let prompt = prompts::story_ideas(idea, style, count);
        self.structured_call(
            Operation::StoryIdeas,
            prompt,
            schema::story_ideas(),
            move |mut ideas: Vec<Story>| {
                truncate_excess(&mut ideas, count, "story ideas");
                ideas
            },
        )
        .await
    }

    /// Generate the `num_characters` central characters of `story`
    pub async fn generate_character_details(
        &self,
        story: &Story,
        num_characters: usize,
        style: &str,
    ) -> Result<Vec<Character>> {
        ensure_positive("num_characters", num_characters)?;

        let prompt = prompts::character_details(story, num_characters, style);
        self.structured_call(
            Operation::CharacterDetails,
            prompt,
            schema::characters(),
            move |mut characters: Vec<Character>| {
                truncate_excess(&mut characters, num_characters, "characters");
                characters
            },
        )
        .await
    }

    /// Generate one square portrait from an image prompt
    pub async fn generate_character_image(&self, prompt: &str) -> Result<GeneratedImage> {
        let credential = self.pool.next_credential()?;
        let request = ImageRequest {
            model: self.settings.image_model.clone(),
            prompt: prompt.to_string(),
            number_of_images: 1,
            aspect_ratio: "1:1".to_string(),
            output_mime_type: self.settings.image_mime_type.clone(),
        };

        let outcome = async {
            let images = self.backend.generate_images(&credential, &request).await?;
            images.into_iter().next().ok_or(UpstreamError::NoImages)
        }
        .await;

        outcome.map_err(|e| classify::normalize(&e, Operation::CharacterImage))
    }

    /// Generate a video script of `duration_secs` featuring `characters`
    ///
    /// The script has one scene per `seconds_per_scene` (8 by default),
    /// rounded up.
    pub async fn generate_script(
        &self,
        story: &Story,
        characters: &[Character],
        duration_secs: u32,
        narration_language: &str,
    ) -> Result<Script> {
        ensure_positive("duration_secs", duration_secs as usize)?;

        let scene_count = Script::expected_scenes(duration_secs, self.settings.seconds_per_scene);
        let prompt = prompts::script(ScriptPrompt {
            story,
            characters,
            duration_secs,
            scene_count,
            narration_language,
            primary_language: &self.settings.primary_language,
        });

        self.structured_call(
            Operation::Script,
            prompt,
            schema::script(),
            move |mut script: Script| {
                truncate_excess(&mut script.scenes, scene_count, "scenes");
                script
            },
        )
        .await
    }

    /// Draw a key, run one schema-constrained call, decode it as `T` and
    /// apply `shape`. Failures after the draw go through the classifier.
    async fn structured_call<T, F>(
        &self,
        operation: Operation,
        prompt: String,
        schema: Schema,
        shape: F,
    ) -> Result<T>
    where
        T: DeserializeOwned + Send,
        F: FnOnce(T) -> T + Send,
    {
        // Drawn before the first await so concurrent calls get distinct keys
        let credential = self.pool.next_credential()?;
        let request = StructuredRequest {
            model: self.settings.text_model.clone(),
            prompt,
            schema,
        };

        let outcome = async {
            let text = self.backend.generate_structured(&credential, &request).await?;
            let parsed: T = serde_json::from_str(text.trim())?;
            Ok::<_, UpstreamError>(parsed)
        }
        .await;

        match outcome {
            Ok(parsed) => {
                debug!(operation = %operation, "Generation succeeded");
                Ok(shape(parsed))
            }
            Err(e) => Err(classify::normalize(&e, operation)),
        }
    }
}

fn ensure_positive(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(TaleforgeError::InvalidRequest(format!(
            "{} must be greater than zero",
            name
        )));
    }
    Ok(())
}

/// The model sometimes over-produces; keep the first `limit` items
fn truncate_excess<T>(items: &mut Vec<T>, limit: usize, what: &str) {
    if items.len() > limit {
        warn!(
            returned = items.len(),
            requested = limit,
            "Upstream returned too many {}, truncating",
            what
        );
        items.truncate(limit);
    }
}

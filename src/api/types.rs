//! Generation Data Types
//!
//! Plain structures handed to and returned from the generation operations.

use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};

/// A story idea
///
/// Identity is assigned by the caller once the story is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub title: String,
    pub summary: String,
}

impl Story {
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
        }
    }
}

/// A central character of a story
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,

    /// English visual and personality description, used as an image prompt
    pub prompt: String,
}

impl Character {
    pub fn new(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
        }
    }
}

/// A generated video script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub summary: String,
    pub scenes: Vec<Scene>,
}

impl Script {
    /// Number of scenes for a video of `duration_secs`: one per
    /// `seconds_per_scene`, rounded up
    pub fn expected_scenes(duration_secs: u32, seconds_per_scene: u32) -> usize {
        duration_secs.div_ceil(seconds_per_scene.max(1)) as usize
    }
}

/// One unit of a script, roughly eight seconds of video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(deserialize_with = "deserialize_scene_id")]
    pub id: u32,

    /// What happens, in the application's primary language
    pub description: String,

    /// Voice-over text, in the requested narration language
    pub narration: String,

    /// English video prompt naming at least one character
    pub veo_prompt: String,

    pub characters_present: Vec<String>,
}

/// A generated image as returned by the upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    /// Base64-encoded image payload
    pub image_bytes: String,
    pub mime_type: String,
}

impl GeneratedImage {
    /// Decode the base64 payload into raw image bytes
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(&self.image_bytes)
    }

    /// A `data:` URL suitable for embedding in HTML
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.image_bytes)
    }
}

/// Scene ids arrive as JSON numbers; accept integral floats such as `2.0`
fn deserialize_scene_id<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(id) = number.as_u64() {
        return u32::try_from(id).map_err(D::Error::custom);
    }

    match number.as_f64() {
        Some(id) if id >= 0.0 && id.fract() == 0.0 && id <= f64::from(u32::MAX) => Ok(id as u32),
        _ => Err(D::Error::custom(format!("invalid scene id: {}", number))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_id_accepts_integral_float() {
        let json = r#"{
            "id": 2.0,
            "description": "d",
            "narration": "n",
            "veo_prompt": "Mira walks",
            "characters_present": ["Mira"]
        }"#;
        let scene: Scene = serde_json::from_str(json).unwrap();
        assert_eq!(scene.id, 2);
    }

    #[test]
    fn test_scene_id_rejects_fraction() {
        let json = r#"{
            "id": 1.5,
            "description": "d",
            "narration": "n",
            "veo_prompt": "p",
            "characters_present": []
        }"#;
        assert!(serde_json::from_str::<Scene>(json).is_err());
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let json = r#"[{ "title": "Only a title" }]"#;
        assert!(serde_json::from_str::<Vec<Story>>(json).is_err());

        let json = r#"{
            "id": 1,
            "description": "d",
            "narration": "n",
            "characters_present": []
        }"#;
        assert!(serde_json::from_str::<Scene>(json).is_err());
    }

    #[test]
    fn test_expected_scenes() {
        assert_eq!(Script::expected_scenes(17, 8), 3);
        assert_eq!(Script::expected_scenes(16, 8), 2);
        assert_eq!(Script::expected_scenes(1, 8), 1);
        assert_eq!(Script::expected_scenes(60, 8), 8);
        assert_eq!(Script::expected_scenes(10, 5), 2);
    }

    #[test]
    fn test_generated_image_decode() {
        let image = GeneratedImage {
            image_bytes: "iVBORw0KGgo=".to_string(),
            mime_type: "image/png".to_string(),
        };
        let bytes = image.decode().unwrap();
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
        assert_eq!(image.data_url(), "data:image/png;base64,iVBORw0KGgo=");
    }

    #[test]
    fn test_generated_image_serializes_camel_case() {
        let image = GeneratedImage {
            image_bytes: "AAAA".to_string(),
            mime_type: "image/png".to_string(),
        };
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["imageBytes"], "AAAA");
        assert_eq!(json["mimeType"], "image/png");
    }
}

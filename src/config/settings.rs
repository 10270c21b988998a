//! Service Settings
//!
//! Defines the configuration schema for the generation service.

use serde::{Deserialize, Serialize};

/// Google Generative Language REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL for the API
    pub base_url: String,

    /// Model used for structured text generation
    pub text_model: String,

    /// Model used for character images
    pub image_model: String,

    /// Requested output format for images
    pub image_mime_type: String,

    /// Language for scene descriptions shown to the user
    pub primary_language: String,

    /// Pacing heuristic: one scene per this many seconds of video
    pub seconds_per_scene: u32,

    /// Where credentials come from
    pub credentials: CredentialsConfig,

    /// Overall request timeout
    pub timeout_secs: u64,

    /// TCP connect timeout
    pub connect_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: "gemini-2.0-flash".to_string(),
            image_model: "imagen-3.0-generate-001".to_string(),
            image_mime_type: "image/png".to_string(),
            primary_language: "Vietnamese".to_string(),
            seconds_per_scene: 8,
            credentials: CredentialsConfig::default(),
            timeout_secs: 300,
            connect_timeout_secs: 10,
        }
    }
}

/// Credential sources, read in order: environment slots first, then raw keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Environment variable names holding API keys
    pub keys_env: Vec<String>,

    /// Raw API keys (alternative to keys_env)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        let mut keys_env: Vec<String> = (1..=10).map(|n| format!("GEMINI_API_KEY_{}", n)).collect();
        keys_env.push("GEMINI_API_KEY".to_string());
        keys_env.push("GOOGLE_API_KEY".to_string());

        Self {
            keys_env,
            keys: Vec::new(),
        }
    }
}

impl CredentialsConfig {
    /// Resolve every configured slot to a value, in order
    pub fn resolve(&self) -> Vec<String> {
        self.keys_env
            .iter()
            .filter_map(|env| std::env::var(env).ok())
            .chain(self.keys.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_slots() {
        let creds = CredentialsConfig::default();
        assert_eq!(creds.keys_env.len(), 12);
        assert_eq!(creds.keys_env[0], "GEMINI_API_KEY_1");
        assert_eq!(creds.keys_env[9], "GEMINI_API_KEY_10");
        assert_eq!(creds.keys_env[10], "GEMINI_API_KEY");
        assert_eq!(creds.keys_env[11], "GOOGLE_API_KEY");
    }

    #[test]
    fn test_deserialize_partial_settings() {
        let json = r#"{
            "text_model": "gemini-2.5-flash",
            "credentials": {
                "keys_env": ["MY_KEY_A", "MY_KEY_B"]
            }
        }"#;

        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.text_model, "gemini-2.5-flash");
        assert_eq!(settings.image_model, "imagen-3.0-generate-001");
        assert_eq!(settings.seconds_per_scene, 8);
        assert_eq!(settings.primary_language, "Vietnamese");
        assert_eq!(settings.credentials.keys_env, vec!["MY_KEY_A", "MY_KEY_B"]);
        assert!(settings.credentials.keys.is_empty());
    }

    #[test]
    fn test_resolve_env_then_raw() {
        std::env::set_var("TALEFORGE_TEST_SETTINGS_KEY", "from-env-0000000");
        let creds = CredentialsConfig {
            keys_env: vec![
                "TALEFORGE_TEST_SETTINGS_KEY".to_string(),
                "TALEFORGE_TEST_SETTINGS_UNSET".to_string(),
            ],
            keys: vec!["raw-key-00000000".to_string()],
        };

        assert_eq!(creds.resolve(), vec!["from-env-0000000", "raw-key-00000000"]);
    }
}

//! API Key Pool Management
//!
//! Holds the validated credentials and hands them out round-robin.

use crate::config::CredentialsConfig;
use crate::credentials::Credential;
use crate::error::{Result, TaleforgeError};
use parking_lot::Mutex;
use tracing::{error, info, warn};

/// Pool of credentials with round-robin rotation
///
/// The pool is fixed at construction. Only the cursor changes, and reading
/// plus advancing it happens under one lock so concurrent draws always get
/// distinct, sequential positions.
#[derive(Debug)]
pub struct KeyPool {
    /// Validated keys in configuration order
    keys: Vec<Credential>,

    /// Index of the next key to hand out; always `< keys.len()` when non-empty
    cursor: Mutex<usize>,
}

impl KeyPool {
    /// Build a pool from raw values, keeping every valid credential in order
    ///
    /// A value repeated across slots is kept once per slot.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<Credential> = values
            .into_iter()
            .filter_map(|value| Credential::parse(value))
            .collect();

        Self {
            keys,
            cursor: Mutex::new(0),
        }
    }

    /// Build a pool from every configured credential source
    ///
    /// Missing or short values are skipped silently.
    pub fn from_config(config: &CredentialsConfig) -> Self {
        let slots = config.keys_env.len() + config.keys.len();
        let pool = Self::new(config.resolve());

        if pool.is_empty() {
            warn!(slots, "No valid API key found in any configured slot");
        } else {
            info!(slots, keys = pool.len(), "Loaded API key pool");
        }
        pool
    }

    /// Check if the pool is empty
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Get the number of keys in the pool
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Position of the key the next draw will return
    pub fn cursor(&self) -> usize {
        *self.cursor.lock()
    }

    /// Draw the key under the cursor and advance the cursor by one
    ///
    /// The cursor advances even if the caller's request later fails, so a
    /// retry naturally lands on a different key.
    pub fn next_credential(&self) -> Result<Credential> {
        if self.keys.is_empty() {
            error!("No valid API key configured");
            return Err(TaleforgeError::Configuration(
                "no valid API key configured. Set GEMINI_API_KEY_1..GEMINI_API_KEY_10 or GEMINI_API_KEY in the environment or .env file".to_string(),
            ));
        }

        let index = {
            let mut cursor = self.cursor.lock();
            let index = *cursor;
            *cursor = (index + 1) % self.keys.len();
            index
        };

        let key = self.keys[index].clone();
        info!(
            index,
            pool_size = self.keys.len(),
            key_suffix = key.suffix(),
            "Using API key"
        );

        Ok(key)
    }
}

//! Configuration Module
//!
//! Handles settings loading and credential source declarations.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{CredentialsConfig, Settings};

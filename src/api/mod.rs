//! API Module
//!
//! Data model, response schemas and prompt builders for the generation operations.

pub mod prompts;
pub mod schema;
pub mod types;

pub use schema::{Schema, SchemaType};
pub use types::{Character, GeneratedImage, Scene, Script, Story};

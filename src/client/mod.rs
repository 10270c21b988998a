//! Client Module
//!
//! HTTP transport and the generation backends built on it.

pub mod backend;
pub mod gemini;
pub mod http;

#[cfg(test)]
pub(crate) mod stub;

pub use backend::{GenerationBackend, ImageRequest, StructuredRequest};
pub use gemini::GeminiBackend;
pub use http::HttpClient;

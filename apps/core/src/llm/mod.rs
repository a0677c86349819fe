//! # LLM Module
//!
//! - `traits`: the [`LlmClient`] seam
//! - `gemini`: REST client for Google's `generateContent` endpoint
//! - `relay`: turns a transcript into model history and recovers failures

pub mod gemini;
pub mod relay;
pub mod traits;

pub use gemini::GeminiClient;
pub use relay::Relay;
pub use traits::LlmClient;

use crate::error::AppError;
use crate::models::{GenerationConfig, ModelTurn};
use async_trait::async_trait;

/// Defines the public interface for a hosted language model.
///
/// This trait abstracts the provider, so the relay can run against Gemini in
/// production and against scripted clients in tests.
#[async_trait]
pub trait LlmClient: Send + Sync + 'static {
    /// Generates a complete text reply for a role-alternating history.
    async fn generate(
        &self,
        turns: &[ModelTurn],
        config: &GenerationConfig,
    ) -> Result<String, AppError>;
}

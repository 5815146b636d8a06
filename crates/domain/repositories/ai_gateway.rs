use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::chatbot::GenerationRequest;

#[automock]
#[async_trait]
pub trait GenerativeAiClient {
    /// Returns the model's raw text reply.
    async fn generate(&self, request: GenerationRequest) -> Result<String>;
}

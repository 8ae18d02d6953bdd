use async_trait::async_trait;

use crate::domain::{DomainError, EmbeddingConfig};

/// Turns conversation text into vectors for similarity search.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError>;

    fn config(&self) -> &EmbeddingConfig;
}

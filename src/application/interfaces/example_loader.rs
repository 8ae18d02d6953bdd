use std::path::Path;

use async_trait::async_trait;

use crate::domain::{DomainError, ExampleStore};

/// Reads the persona dataset once at startup.
#[async_trait]
pub trait ExampleLoader: Send + Sync {
    /// Fails with [`DomainError::DataLoadError`] when the source is missing or
    /// does not match the expected schema.
    async fn load(&self, path: &Path) -> Result<ExampleStore, DomainError>;
}

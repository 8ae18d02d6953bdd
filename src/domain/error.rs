use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Data load error: {0}")]
    DataLoadError(String),

    #[error("Insufficient examples: {0}")]
    InsufficientExamples(String),

    #[error("Upstream error: {0}")]
    UpstreamError(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn data_load(msg: impl Into<String>) -> Self {
        Self::DataLoadError(msg.into())
    }

    pub fn insufficient_examples(msg: impl Into<String>) -> Self {
        Self::InsufficientExamples(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamError(msg.into())
    }

    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::EmbeddingError(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn is_data_load(&self) -> bool {
        matches!(self, Self::DataLoadError(_))
    }

    pub fn is_insufficient_examples(&self) -> bool {
        matches!(self, Self::InsufficientExamples(_))
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::UpstreamError(_))
    }

    /// Errors that end the process rather than a single turn.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DataLoadError(_) | Self::InsufficientExamples(_) | Self::Internal(_)
        )
    }
}

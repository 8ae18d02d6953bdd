pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    ChatClient, ChatSession, EmbeddingService, ExampleLoader, FewShotSelector, Prompt,
    PromptBuilder, ResponseGenerator,
};

pub use connector::{
    AnthropicClient, JsonExampleLoader, MockEmbedding, NgramEmbedding, TogetherClient,
};

pub use domain::{
    ClientConfig, ConversationExample, DomainError, EmbeddingConfig, ExampleStore,
    GeneratorConfig, Provider, ScoredExample, SituationalContext, Speaker, TimeOfDay,
    TopicFilter, Transcript, TranscriptEntry, Turn,
};

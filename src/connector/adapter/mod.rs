mod anthropic_client;
mod json_example_loader;
mod mock_embedding;
mod ngram_embedding;
mod together_client;

pub use anthropic_client::*;
pub use json_example_loader::*;
pub use mock_embedding::*;
pub use ngram_embedding::*;
pub use together_client::*;

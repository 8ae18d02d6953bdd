mod config;
mod conversation;
mod embedding;
mod example_store;
mod scored_example;
mod situational_context;
mod transcript;

pub use config::*;
pub use conversation::*;
pub use embedding::*;
pub use example_store::*;
pub use scored_example::*;
pub use situational_context::*;
pub use transcript::*;

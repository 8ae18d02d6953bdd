mod chat_client;
mod embedding_service;
mod example_loader;

pub use chat_client::*;
pub use embedding_service::*;
pub use example_loader::*;

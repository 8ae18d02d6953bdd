mod chat_session;
mod few_shot_selector;
mod generate_response;
mod prompt_builder;

pub use chat_session::*;
pub use few_shot_selector::*;
pub use generate_response::*;
pub use prompt_builder::*;

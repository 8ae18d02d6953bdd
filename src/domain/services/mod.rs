//! Domain services: pure text handling shared by the use cases.

mod text;
mod topic_filter;

pub use text::*;
pub use topic_filter::*;
